//! Open Packaging Convention (OPC) support.
//!
//! OPC is the container format shared by the Office Open XML document types.
//! A package is a ZIP archive of parts named by pack URIs, tied together by
//! relationship files and a [Content_Types].xml map. This module provides the
//! read side only: opening a package and walking its relationship graph.

pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

pub use error::{OpcError, Result};
pub use package::{OpcPackage, Part};
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
