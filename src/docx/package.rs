//! High-level access to a Word (.docx) package.

use crate::docx::styles::StyleMap;
use crate::error::{Error, Result};
use crate::opc::constants::{content_type, relationship_type};
use crate::opc::{OpcPackage, Part};
use std::io::{Read, Seek};
use std::path::Path;

/// A Word document package.
///
/// Wraps the OPC container and exposes the pieces extraction needs: the main
/// document part, its style definitions, and the relationships that lead to
/// embedded media.
pub struct Package {
    opc: OpcPackage,
}

impl Package {
    /// Open a Word document from a file path.
    ///
    /// Only the `.docx` extension is accepted. The main document part's
    /// content type is verified before returning.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if ext != "docx" {
            return Err(Error::UnsupportedFormat(path.display().to_string()));
        }

        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Read a Word document from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let package = Self { opc };

        let main = package.main_part()?;
        if main.content_type() != content_type::WML_DOCUMENT_MAIN {
            return Err(Error::InvalidContentType {
                expected: content_type::WML_DOCUMENT_MAIN.to_string(),
                got: main.content_type().to_string(),
            });
        }

        Ok(package)
    }

    /// Get the main document part (/word/document.xml).
    pub fn main_part(&self) -> Result<&Part> {
        Ok(self.opc.main_document_part()?)
    }

    /// Load the style map from the styles part, if the document has one.
    pub fn styles(&self) -> Result<StyleMap> {
        let main = self.main_part()?;
        let Some(rel) = main.rels().rel_of_type(relationship_type::STYLES) else {
            return Ok(StyleMap::default());
        };
        let part = self.opc.get_part(&rel.target_partname()?)?;
        StyleMap::from_xml(part.blob())
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc(&self) -> &OpcPackage {
        &self.opc
    }
}
