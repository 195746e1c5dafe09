//! Minimal XML element tree
//!
//! Addon lists are flat documents of attribute-only elements, so the tree
//! keeps element names, attributes and children and drops text content.

use std::collections::HashMap;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Errors raised while parsing an XML document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Malformed(String),
    #[error("XML document has no root element")]
    NoRoot,
    #[error("Unexpected closing tag </{0}>")]
    UnexpectedEnd(String),
    #[error("Unclosed element <{0}>")]
    Unclosed(String),
}

/// One parsed XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: HashMap<String, String>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Create an element without attributes or children
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builder-style attribute setter, mostly for tests
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Parse a complete document and return its root element
    pub fn parse(data: &str) -> Result<XmlNode, XmlError> {
        let mut reader = Reader::from_str(data);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| XmlError::Malformed(e.to_string()))?;
            match event {
                Event::Start(start) => stack.push(Self::from_start(&start)?),
                Event::Empty(start) => {
                    let node = Self::from_start(&start)?;
                    Self::attach(&mut stack, &mut root, node);
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    let node = stack.pop().ok_or(XmlError::UnexpectedEnd(name))?;
                    Self::attach(&mut stack, &mut root, node);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }
        root.ok_or(XmlError::NoRoot)
    }

    fn from_start(start: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
        let mut node = XmlNode::new(&String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlError::Malformed(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| XmlError::Malformed(e.to_string()))?
                .into_owned();
            node.attributes.insert(key, value);
        }
        Ok(node)
    }

    fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            // Only the first top-level element counts as the document root
            None => {
                if root.is_none() {
                    *root = Some(node);
                }
            }
        }
    }

    /// Element (tag) name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child elements in document order
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Raw attribute value
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Typed attribute value; `None` when missing or unparsable
    pub fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        self.attr(key).and_then(|v| v.parse().ok())
    }

    /// Overwrite `out` with the attribute value if it is present and parses.
    /// Returns whether `out` was written.
    pub fn get_into<T: FromStr>(&self, key: &str, out: &mut T) -> bool {
        match self.get(key) {
            Some(v) => {
                *out = v;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_document() {
        let doc = r#"<?xml version="1.0"?>
<assets>
  <kart name="Tux" version="3"/>
  <track name="Hacienda" file="hacienda.zip"></track>
</assets>"#;
        let root = XmlNode::parse(doc).unwrap();
        assert_eq!(root.name(), "assets");
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].name(), "kart");
        assert_eq!(root.children()[0].get::<u32>("version"), Some(3));
        assert_eq!(root.children()[1].attr("file"), Some("hacienda.zip"));
    }

    #[test]
    fn test_unescapes_attribute_values() {
        let root = XmlNode::parse(r#"<kart name="Bits &amp; &quot;Bobs&quot;"/>"#).unwrap();
        assert_eq!(root.attr("name"), Some("Bits & \"Bobs\""));
    }

    #[test]
    fn test_get_unparsable_is_none() {
        let node = XmlNode::new("kart").with_attr("version", "abc");
        assert_eq!(node.get::<u32>("version"), None);
        assert_eq!(node.get::<u32>("missing"), None);
    }

    #[test]
    fn test_get_into_leaves_default() {
        let node = XmlNode::new("kart").with_attr("version", "x");
        let mut version = 0u32;
        assert!(!node.get_into("version", &mut version));
        assert_eq!(version, 0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(XmlNode::parse(""), Err(XmlError::NoRoot));
        assert!(XmlNode::parse("<addons><kart/>").is_err());
        assert!(XmlNode::parse("<addons></kart>").is_err());
    }
}
