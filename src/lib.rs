//! Longan - content block extraction for Word documents
//!
//! This library walks a .docx document body and reconstructs an ordered,
//! typed stream of content blocks: plain text, headings, images, and
//! mathematical formulas. Embedded images are resolved through both the
//! modern drawing markup and legacy VML, validated, and persisted to disk.
//! OMML formulas are collected and normalized toward LaTeX; free-text LaTeX
//! formulas are detected heuristically.
//!
//! # Example
//!
//! ```no_run
//! use longan::DocumentExtractor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = DocumentExtractor::new("output/images");
//! let result = extractor.extract("document.docx")?;
//!
//! for entry in &result.structure {
//!     println!("{} {}", "#".repeat(entry.level as usize), entry.text);
//! }
//! for block in &result.content_blocks {
//!     println!("{:?}", block);
//! }
//! # Ok(())
//! # }
//! ```

pub mod docx;
pub mod error;
pub mod extract;
pub mod opc;
mod xml;

pub use error::{Error, Result};
pub use extract::{
    ContentBlock, DocumentExtractor, ExtractionResult, FormatInfo, FormulaKind, OutlineEntry,
    PositionInfo,
};
