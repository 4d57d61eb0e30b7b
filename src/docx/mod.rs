//! WordprocessingML (.docx) document model.
//!
//! A thin read-only layer over the OPC container: opening a package, splitting
//! the body into its top-level children, and reading paragraph text, styles,
//! and formatting properties.

pub mod body;
pub mod format;
pub mod package;
pub mod paragraph;
pub mod styles;

pub use body::{BodyElement, body_elements};
pub use format::{Alignment, ParagraphFormat};
pub use package::Package;
pub use paragraph::Paragraph;
pub use styles::StyleMap;
