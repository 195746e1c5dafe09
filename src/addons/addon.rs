//! Addon metadata record
//!
//! One record per downloadable package (kart, track, arena). Records come
//! either from the online catalog or from the local list of installed
//! addons, and the two sources carry different attributes.

use std::io::{self, Write};

use quick_xml::escape::escape;

use super::xml::XmlNode;

/// A downloadable content package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Addon {
    name: String,
    id: String,
    /// Tag name of the element this record was read from
    addon_type: String,
    installed: bool,
    installed_version: u32,
    /// Version available in the catalog
    version: u32,
    zip_file: String,
    description: String,
    icon: String,
}

impl Addon {
    /// Build a record from an XML element.
    ///
    /// Installed entries read `id` and `installed-version`; catalog entries
    /// read `file`, `description`, `icon` and `version` and derive the id
    /// from the lower-cased name. Missing or unparsable attributes keep
    /// their defaults.
    pub fn from_xml(xml: &XmlNode, installed: bool) -> Self {
        let mut addon = Addon {
            addon_type: xml.name().to_string(),
            installed,
            ..Default::default()
        };

        xml.get_into("name", &mut addon.name);
        if installed {
            xml.get_into("installed-version", &mut addon.installed_version);
            xml.get_into("id", &mut addon.id);
        } else {
            xml.get_into("file", &mut addon.zip_file);
            xml.get_into("description", &mut addon.description);
            xml.get_into("icon", &mut addon.icon);
            xml.get_into("version", &mut addon.version);
            // The catalog's numeric id is not used
            addon.id = addon.name.to_lowercase();
        }
        addon
    }

    /// Copy the catalog data (description, version, archive, icon) from a
    /// freshly fetched entry. Identity and installed version stay as is.
    pub fn copy_install_data(&mut self, addon: &Addon) {
        self.description = addon.description.clone();
        self.version = addon.version;
        self.zip_file = addon.zip_file.clone();
        self.icon = addon.icon.clone();
    }

    /// Write the installed-list element for this addon.
    ///
    /// Only meaningful for installed addons.
    pub fn write_xml<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "  <{} name=\"{}\" id=\"{}\" installed-version=\"{}\"/>",
            self.addon_type,
            escape(self.name.as_str()),
            escape(self.id.as_str()),
            self.installed_version
        )
    }

    /// Record a completed installation of the catalog version
    pub fn set_installed(&mut self) {
        self.installed = true;
        self.installed_version = self.version;
    }

    /// Record an uninstall; the id stays so the entry can be reinstalled
    pub fn clear_installed(&mut self) {
        self.installed = false;
        self.installed_version = 0;
    }

    /// Installed and the catalog offers a newer version
    pub fn needs_update(&self) -> bool {
        self.installed && self.installed_version < self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn addon_type(&self) -> &str {
        &self.addon_type
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn installed_version(&self) -> u32 {
        self.installed_version
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn zip_file(&self) -> &str {
        &self.zip_file
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog_node() -> XmlNode {
        XmlNode::new("kart")
            .with_attr("name", "Gnu Racer")
            .with_attr("id", "42")
            .with_attr("file", "gnu.zip")
            .with_attr("description", "A gnu")
            .with_attr("icon", "gnu.png")
            .with_attr("version", "3")
    }

    #[test]
    fn test_from_catalog_node() {
        let addon = Addon::from_xml(&catalog_node(), false);
        assert_eq!(addon.addon_type(), "kart");
        assert_eq!(addon.name(), "Gnu Racer");
        assert_eq!(addon.id(), "gnu racer");
        assert_eq!(addon.zip_file(), "gnu.zip");
        assert_eq!(addon.description(), "A gnu");
        assert_eq!(addon.icon(), "gnu.png");
        assert_eq!(addon.version(), 3);
        assert_eq!(addon.installed_version(), 0);
        assert!(!addon.is_installed());
    }

    #[test]
    fn test_from_installed_node_skips_catalog_fields() {
        let node = catalog_node()
            .with_attr("id", "gnu-racer")
            .with_attr("installed-version", "2");
        let addon = Addon::from_xml(&node, true);
        assert_eq!(addon.id(), "gnu-racer");
        assert_eq!(addon.installed_version(), 2);
        assert!(addon.is_installed());
        assert_eq!(addon.version(), 0);
        assert_eq!(addon.zip_file(), "");
        assert_eq!(addon.description(), "");
        assert_eq!(addon.icon(), "");
    }

    #[test]
    fn test_missing_version_defaults_to_zero() {
        let node = XmlNode::new("track").with_attr("name", "Snow Peak");
        let addon = Addon::from_xml(&node, false);
        assert_eq!(addon.version(), 0);
        assert_eq!(addon.id(), "snow peak");
    }

    #[test]
    fn test_malformed_version_defaults_to_zero() {
        let node = XmlNode::new("track")
            .with_attr("name", "x")
            .with_attr("version", "three");
        assert_eq!(Addon::from_xml(&node, false).version(), 0);
    }

    #[test]
    fn test_copy_install_data() {
        let installed_node = XmlNode::new("kart")
            .with_attr("name", "Gnu Racer")
            .with_attr("id", "gnu")
            .with_attr("installed-version", "1");
        let mut installed = Addon::from_xml(&installed_node, true);
        let catalog = Addon::from_xml(&catalog_node(), false);

        installed.copy_install_data(&catalog);

        assert_eq!(installed.id(), "gnu");
        assert_eq!(installed.installed_version(), 1);
        assert!(installed.is_installed());
        assert_eq!(installed.version(), 3);
        assert_eq!(installed.zip_file(), "gnu.zip");
        assert_eq!(installed.icon(), "gnu.png");
        assert_eq!(installed.description(), "A gnu");
        assert!(installed.needs_update());
    }

    #[test]
    fn test_write_xml() {
        let node = XmlNode::new("arena")
            .with_attr("name", "Temple")
            .with_attr("id", "temple")
            .with_attr("installed-version", "4");
        let addon = Addon::from_xml(&node, true);
        let mut out = Vec::new();
        addon.write_xml(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  <arena name=\"Temple\" id=\"temple\" installed-version=\"4\"/>\n"
        );
    }

    #[test]
    fn test_write_xml_escapes_attributes() {
        let node = XmlNode::new("kart")
            .with_attr("name", "Bits & \"Bobs\"")
            .with_attr("id", "b&b")
            .with_attr("installed-version", "1");
        let addon = Addon::from_xml(&node, true);
        let mut out = Vec::new();
        addon.write_xml(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("name=\"Bits &amp; &quot;Bobs&quot;\""));
        assert!(text.contains("id=\"b&amp;b\""));

        let reparsed = XmlNode::parse(text.trim()).unwrap();
        assert_eq!(Addon::from_xml(&reparsed, true), addon);
    }

    #[test]
    fn test_set_and_clear_installed() {
        let mut addon = Addon::from_xml(&catalog_node(), false);
        addon.set_installed();
        assert!(addon.is_installed());
        assert_eq!(addon.installed_version(), 3);
        assert!(!addon.needs_update());

        addon.clear_installed();
        assert!(!addon.is_installed());
        assert_eq!(addon.id(), "gnu racer");
    }

    proptest! {
        #[test]
        fn prop_catalog_id_is_lowercase_name(name in "[A-Za-z0-9 _-]{0,24}") {
            let node = XmlNode::new("kart").with_attr("name", &name);
            let addon = Addon::from_xml(&node, false);
            prop_assert_eq!(addon.id(), name.to_lowercase());
        }

        #[test]
        fn prop_copy_install_data_keeps_identity(
            id in "[a-z]{1,12}",
            installed_version in 0u32..100,
            version in 0u32..100,
            file in "[a-z]{0,8}\\.zip",
        ) {
            let mut target = Addon::from_xml(
                &XmlNode::new("track")
                    .with_attr("name", "Target")
                    .with_attr("id", &id)
                    .with_attr("installed-version", &installed_version.to_string()),
                true,
            );
            let source = Addon::from_xml(
                &XmlNode::new("track")
                    .with_attr("name", "Source")
                    .with_attr("file", &file)
                    .with_attr("version", &version.to_string()),
                false,
            );
            target.copy_install_data(&source);
            prop_assert_eq!(target.id(), id.as_str());
            prop_assert_eq!(target.installed_version(), installed_version);
            prop_assert_eq!(target.version(), version);
            prop_assert_eq!(target.name(), "Target");
        }
    }
}
