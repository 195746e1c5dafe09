//! Addon list management
//!
//! Merges the local installed list with the online catalog and persists the
//! installed entries back to `addons_installed.xml`.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;

use super::addon::Addon;
use super::xml::{XmlError, XmlNode};

/// Addon manager shared between the screen and the install worker
pub type SharedAddons = Arc<RwLock<AddonsManager>>;

/// File name of the persisted installed list
pub const INSTALLED_FILE: &str = "addons_installed.xml";

/// The merged list of known addons
#[derive(Debug, Default)]
pub struct AddonsManager {
    addons: Vec<Addon>,
    catalog_loaded: bool,
}

impl AddonsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a new manager for sharing across threads
    pub fn shared() -> SharedAddons {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Parse the installed list; every child element is an installed addon.
    ///
    /// Returns the number of entries read.
    pub fn load_installed(&mut self, data: &str) -> Result<usize, XmlError> {
        let root = XmlNode::parse(data)?;
        let mut count = 0;
        for node in root.children() {
            let addon = Addon::from_xml(node, true);
            if addon.id().is_empty() {
                log::warn!("Installed addon '{}' has no id, skipping", addon.name());
                continue;
            }
            match self.position(addon.id()) {
                Some(idx) => self.addons[idx] = addon,
                None => self.addons.push(addon),
            }
            count += 1;
        }
        log::debug!("Loaded {} installed addons", count);
        Ok(count)
    }

    /// Parse the online catalog and merge it into the list.
    ///
    /// Installed entries only take the catalog's install data; unknown
    /// entries are appended. Returns the number of catalog entries read.
    pub fn load_catalog(&mut self, data: &str) -> Result<usize, XmlError> {
        let root = XmlNode::parse(data)?;
        let mut count = 0;
        for node in root.children() {
            let entry = Addon::from_xml(node, false);
            if entry.id().is_empty() {
                log::warn!("Catalog entry <{}> has no name, skipping", node.name());
                continue;
            }
            match self.position(entry.id()) {
                Some(idx) if self.addons[idx].is_installed() => {
                    self.addons[idx].copy_install_data(&entry)
                }
                Some(idx) => self.addons[idx] = entry,
                None => self.addons.push(entry),
            }
            count += 1;
        }
        self.catalog_loaded = true;
        log::info!("Catalog lists {} addons", count);
        Ok(count)
    }

    /// Write the installed list document
    pub fn save_installed<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "<?xml version=\"1.0\"?>")?;
        writeln!(out, "<addons>")?;
        for addon in self.addons.iter().filter(|a| a.is_installed()) {
            addon.write_xml(out)?;
        }
        writeln!(out, "</addons>")
    }

    /// Load the installed list from disk; a missing file is an empty list
    pub fn load_installed_file(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            log::info!("No installed addon list at {}", path.display());
            return Ok(0);
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.load_installed(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load the catalog from a locally cached file
    pub fn load_catalog_file(&mut self, path: &Path) -> Result<usize> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        self.load_catalog(&data)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))
    }

    /// Persist the installed list
    pub fn save_installed_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.save_installed(&mut file)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.addons.iter().position(|a| a.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Addon> {
        self.addons.iter_mut().find(|a| a.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Addon> {
        self.addons.iter()
    }

    /// Addons of one type, sorted by name
    pub fn iter_type(&self, addon_type: &str) -> Vec<&Addon> {
        let mut list: Vec<&Addon> = self
            .addons
            .iter()
            .filter(|a| a.addon_type() == addon_type)
            .collect();
        list.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        list
    }

    /// Mark an addon installed at its catalog version
    pub fn mark_installed(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(addon) => {
                addon.set_installed();
                true
            }
            None => false,
        }
    }

    pub fn mark_uninstalled(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(addon) => {
                addon.clear_installed();
                true
            }
            None => false,
        }
    }

    pub fn is_catalog_loaded(&self) -> bool {
        self.catalog_loaded
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }
}
