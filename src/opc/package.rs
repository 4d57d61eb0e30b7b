//! OpcPackage and Part objects modeling an Open Packaging Convention container.
//!
//! An OPC package is read by walking its relationship graph: the package-level
//! relationships point at the main document part, whose own relationships point
//! at styles, media, and further parts. Only parts reachable from the package
//! relationships are loaded.

use crate::opc::constants::relationship_type;
use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{PACKAGE_URI, PackURI};
use crate::opc::phys_pkg::PhysPkgReader;
use crate::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{Read, Seek};
use std::path::Path;

/// Content type map built from [Content_Types].xml.
///
/// Implements the OPC content type discovery algorithm using Default and
/// Override elements. Overrides win over extension defaults.
struct ContentTypeMap {
    /// Maps file extensions to default content types
    defaults: HashMap<String, String>,

    /// Maps specific partnames to override content types
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    /// Parse content types from [Content_Types].xml.
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut defaults = HashMap::new();
        let mut overrides = HashMap::new();

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"Default" => {
                            // <Default Extension="xml" ContentType="application/xml"/>
                            let mut extension = None;
                            let mut content_type = None;

                            for attr in e.attributes() {
                                let attr = attr?;
                                match attr.key.as_ref() {
                                    b"Extension" => {
                                        extension = Some(attr.unescape_value()?.to_string());
                                    },
                                    b"ContentType" => {
                                        content_type = Some(attr.unescape_value()?.to_string());
                                    },
                                    _ => {},
                                }
                            }

                            if let (Some(ext), Some(ct)) = (extension, content_type) {
                                defaults.insert(ext.to_lowercase(), ct);
                            }
                        },
                        b"Override" => {
                            // <Override PartName="/word/document.xml" ContentType="..."/>
                            let mut partname = None;
                            let mut content_type = None;

                            for attr in e.attributes() {
                                let attr = attr?;
                                match attr.key.as_ref() {
                                    b"PartName" => {
                                        partname = Some(attr.unescape_value()?.to_string());
                                    },
                                    b"ContentType" => {
                                        content_type = Some(attr.unescape_value()?.to_string());
                                    },
                                    _ => {},
                                }
                            }

                            if let (Some(pn), Some(ct)) = (partname, content_type) {
                                overrides.insert(pn, ct);
                            }
                        },
                        _ => {},
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(Self {
            defaults,
            overrides,
        })
    }

    /// Get the content type for a partname.
    ///
    /// Checks overrides first, then falls back to the extension default.
    fn get(&self, pack_uri: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Ok(ct.clone());
        }

        let ext = pack_uri.ext().to_lowercase();
        self.defaults
            .get(&ext)
            .cloned()
            .ok_or_else(|| OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// A part within an OPC package.
///
/// Holds the part's binary content along with its name, content type, and the
/// relationships originating from it.
#[derive(Debug)]
pub struct Part {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl Part {
    /// Get the partname (pack URI) of this part.
    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Get the content type of this part.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Get the binary content of this part.
    #[inline]
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Get the relationships originating from this part.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.rels
    }
}

/// An in-memory OPC package, loaded by walking the relationship graph.
pub struct OpcPackage {
    /// Package-level relationships (from /_rels/.rels)
    pkg_rels: Relationships,

    /// Loaded parts, keyed by partname string
    parts: HashMap<String, Part>,
}

impl OpcPackage {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let phys_reader = PhysPkgReader::open(path)?;
        Self::load(phys_reader)
    }

    /// Read an OPC package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let phys_reader = PhysPkgReader::from_reader(reader)?;
        Self::load(phys_reader)
    }

    fn load(mut phys_reader: PhysPkgReader) -> Result<Self> {
        let content_types = ContentTypeMap::from_xml(phys_reader.content_types_xml()?)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_rels_xml = phys_reader
            .rels_xml_for(&package_uri)?
            .ok_or_else(|| OpcError::RelationshipNotFound("/_rels/.rels".to_string()))?
            .to_vec();
        let pkg_rels = Relationships::from_xml(&pkg_rels_xml, package_uri.base_uri())?;

        // Breadth-first walk of the relationship graph, loading each internal
        // target part exactly once.
        let mut parts = HashMap::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<PackURI> = VecDeque::new();

        for rel in pkg_rels.iter().filter(|r| !r.is_external()) {
            queue.push_back(rel.target_partname()?);
        }

        while let Some(partname) = queue.pop_front() {
            if !visited.insert(partname.as_str().to_string()) {
                continue;
            }

            // Dangling relationships (targets missing from the archive) are
            // skipped rather than failing the whole package.
            if !phys_reader.contains(&partname) {
                log::warn!("relationship target missing from package: {}", partname);
                continue;
            }

            let blob = phys_reader.take_blob(&partname)?;
            let content_type = content_types.get(&partname)?;

            let rels = match phys_reader.rels_xml_for(&partname)? {
                Some(xml) => {
                    let xml = xml.to_vec();
                    Relationships::from_xml(&xml, partname.base_uri())?
                },
                None => Relationships::default(),
            };

            for rel in rels.iter().filter(|r| !r.is_external()) {
                let target = rel.target_partname()?;
                if !visited.contains(target.as_str()) {
                    queue.push_back(target);
                }
            }

            parts.insert(
                partname.as_str().to_string(),
                Part {
                    partname,
                    content_type,
                    blob,
                    rels,
                },
            );
        }

        Ok(Self { pkg_rels, parts })
    }

    /// Get the package-level relationships.
    #[inline]
    pub fn rels(&self) -> &Relationships {
        &self.pkg_rels
    }

    /// Get a part by its partname.
    pub fn get_part(&self, partname: &PackURI) -> Result<&Part> {
        self.parts
            .get(partname.as_str())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Get the main document part, located via the officeDocument
    /// package relationship.
    pub fn main_document_part(&self) -> Result<&Part> {
        let rel = self
            .pkg_rels
            .rel_of_type(relationship_type::OFFICE_DOCUMENT)
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(relationship_type::OFFICE_DOCUMENT.to_string())
            })?;
        self.get_part(&rel.target_partname()?)
    }

    /// Iterate over all loaded parts, in no particular order.
    pub fn iter_parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opc::constants::content_type;
    use std::io::{Cursor, Write};
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

    const PKG_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    const DOC_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
</Relationships>"#;

    fn minimal_docx() -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut data));
            let options = SimpleFileOptions::default();
            let entries: [(&str, &[u8]); 5] = [
                ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
                ("_rels/.rels", PKG_RELS.as_bytes()),
                ("word/document.xml", b"<w:document/>"),
                ("word/_rels/document.xml.rels", DOC_RELS.as_bytes()),
                ("word/media/image1.png", b"\x89PNGfake"),
            ];
            for (name, blob) in entries {
                writer.start_file(name, options).unwrap();
                writer.write_all(blob).unwrap();
            }
            writer.finish().unwrap();
        }
        data
    }

    #[test]
    fn test_graph_walk_loads_reachable_parts() {
        let package = OpcPackage::from_reader(Cursor::new(minimal_docx())).unwrap();

        let main = package.main_document_part().unwrap();
        assert_eq!(main.partname().as_str(), "/word/document.xml");
        assert_eq!(main.content_type(), content_type::WML_DOCUMENT_MAIN);
        assert_eq!(main.blob(), b"<w:document/>");

        // Image part is reachable through the document's relationships.
        let image_uri = PackURI::new("/word/media/image1.png").unwrap();
        let image = package.get_part(&image_uri).unwrap();
        assert_eq!(image.content_type(), content_type::PNG);
        assert_eq!(image.blob(), b"\x89PNGfake");
    }

    #[test]
    fn test_image_rel_resolves_from_main_part() {
        let package = OpcPackage::from_reader(Cursor::new(minimal_docx())).unwrap();
        let main = package.main_document_part().unwrap();

        let rel = main.rels().get("rId7").unwrap();
        assert_eq!(
            rel.target_partname().unwrap().as_str(),
            "/word/media/image1.png"
        );
    }

    #[test]
    fn test_missing_content_types_is_error() {
        let mut data = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut data));
            let options = SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(b"<w:document/>").unwrap();
            writer.finish().unwrap();
        }
        assert!(OpcPackage::from_reader(Cursor::new(data)).is_err());
    }
}
