//! Relationship-related objects for OPC packages.
//!
//! Each part in an OPC package may carry a set of relationships to other parts
//! or to external resources, stored in a companion `.rels` part. This module
//! provides the relationship value types and the `.rels` XML parser.

use crate::opc::constants::target_mode;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// A single relationship from a source part to a target.
///
/// Identified by an rId (relationship ID). Can be either internal (pointing to
/// another part) or external (pointing to an external URL).
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a part URI or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    /// Whether this is an external relationship
    is_external: bool,
}

impl Relationship {
    /// Get the relationship ID.
    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    /// Get the relationship type.
    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    /// Get the target reference.
    ///
    /// For internal relationships, this is a relative part reference.
    /// For external relationships, this is an absolute URL.
    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    /// Check if this is an external relationship.
    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Get the absolute target partname for internal relationships.
    ///
    /// Returns an error if this is an external relationship.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(
                "Cannot get target_partname for external relationship".to_string(),
            ));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source.
///
/// Uses a HashMap for O(1) lookup by relationship ID.
#[derive(Debug, Default)]
pub struct Relationships {
    /// Map of relationship ID to Relationship
    rels: HashMap<String, Relationship>,
}

impl Relationships {
    /// Parse a relationships collection from `.rels` XML.
    ///
    /// # Arguments
    /// * `rels_xml` - Content of the `.rels` part
    /// * `base_uri` - Base URI of the source part, used to resolve relative
    ///   target references
    pub fn from_xml(rels_xml: &[u8], base_uri: &str) -> Result<Self> {
        let mut rels = HashMap::new();
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut r_id = None;
                        let mut reltype = None;
                        let mut target_ref = None;
                        let mut mode = target_mode::INTERNAL.to_string();

                        for attr in e.attributes() {
                            let attr = attr?;
                            match attr.key.as_ref() {
                                b"Id" => r_id = Some(attr.unescape_value()?.to_string()),
                                b"Type" => reltype = Some(attr.unescape_value()?.to_string()),
                                b"Target" => target_ref = Some(attr.unescape_value()?.to_string()),
                                b"TargetMode" => mode = attr.unescape_value()?.to_string(),
                                _ => {},
                            }
                        }

                        if let (Some(id), Some(rt), Some(tr)) = (r_id, reltype, target_ref) {
                            rels.insert(
                                id.clone(),
                                Relationship {
                                    r_id: id,
                                    reltype: rt,
                                    target_ref: tr,
                                    base_uri: base_uri.to_string(),
                                    is_external: mode == target_mode::EXTERNAL,
                                },
                            );
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self { rels })
    }

    /// Get a relationship by its ID.
    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Find the first relationship of the given type.
    pub fn rel_of_type(&self, reltype: &str) -> Option<&Relationship> {
        self.rels.values().find(|rel| rel.reltype() == reltype)
    }

    /// Iterate over all relationships, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    /// Get the number of relationships in the collection.
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::constants::relationship_type;

    const RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_from_xml() {
        let rels = Relationships::from_xml(RELS_XML, "/word").unwrap();
        assert_eq!(rels.len(), 3);

        let image = rels.get("rId2").unwrap();
        assert_eq!(image.reltype(), relationship_type::IMAGE);
        assert!(!image.is_external());
        assert_eq!(
            image.target_partname().unwrap().as_str(),
            "/word/media/image1.png"
        );
    }

    #[test]
    fn test_external_relationship() {
        let rels = Relationships::from_xml(RELS_XML, "/word").unwrap();
        let link = rels.get("rId3").unwrap();
        assert!(link.is_external());
        assert!(link.target_partname().is_err());
    }

    #[test]
    fn test_rel_of_type() {
        let rels = Relationships::from_xml(RELS_XML, "/word").unwrap();
        let styles = rels.rel_of_type(relationship_type::STYLES).unwrap();
        assert_eq!(styles.r_id(), "rId1");
        assert!(rels.rel_of_type("urn:nonexistent").is_none());
    }
}
