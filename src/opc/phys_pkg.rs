//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! This module handles the low-level reading of OPC packages from ZIP archives.
//! The whole archive is decompressed up front into an in-memory map so that the
//! higher layers can resolve parts in any order without re-seeking the archive.

use crate::opc::error::{OpcError, Result};
use crate::opc::packuri::{CONTENT_TYPES_URI, PackURI};
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

/// Physical package reader that provides access to the members of a ZIP-based
/// OPC package.
pub struct PhysPkgReader {
    /// Decompressed archive members, keyed by membername (no leading slash)
    members: HashMap<String, Vec<u8>>,
}

impl PhysPkgReader {
    /// Open an OPC package from a file path.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist, isn't a valid ZIP file,
    /// or cannot be read.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }

        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Read an OPC package from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(file.name().to_string(), blob);
        }

        Ok(Self { members })
    }

    /// Get the binary content for a part by its PackURI.
    pub fn blob_for(&self, pack_uri: &PackURI) -> Result<&[u8]> {
        self.members
            .get(pack_uri.membername())
            .map(Vec::as_slice)
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    /// Take ownership of a member's content, removing it from the reader.
    ///
    /// Used while unmarshalling the part graph to avoid cloning blobs.
    pub fn take_blob(&mut self, pack_uri: &PackURI) -> Result<Vec<u8>> {
        self.members
            .remove(pack_uri.membername())
            .ok_or_else(|| OpcError::PartNotFound(pack_uri.to_string()))
    }

    /// Get the [Content_Types].xml content.
    ///
    /// This is a required part of every OPC package that maps parts to content types.
    pub fn content_types_xml(&self) -> Result<&[u8]> {
        let uri = PackURI::new(CONTENT_TYPES_URI).map_err(OpcError::InvalidPackUri)?;
        self.blob_for(&uri)
    }

    /// Get the relationships XML for a specific source URI.
    ///
    /// Relationships files are stored in _rels directories and have a .rels
    /// extension. Returns None if the source has no relationships file.
    pub fn rels_xml_for(&self, source_uri: &PackURI) -> Result<Option<&[u8]>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Ok(self.members.get(rels_uri.membername()).map(Vec::as_slice))
    }

    /// Get the number of files in the package.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if the package is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check if a specific member exists in the package.
    pub fn contains(&self, pack_uri: &PackURI) -> bool {
        self.members.contains_key(pack_uri.membername())
    }
}
