/// Error types for document extraction.
use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for extraction operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File extension is not a supported document format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// OPC package error
    #[error("OPC error: {0}")]
    Opc(#[from] crate::opc::OpcError),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Part not found
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// Invalid content type
    #[error("Invalid content type: expected {expected}, got {got}")]
    InvalidContentType { expected: String, got: String },

    /// Image decoding or re-encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.to_string())
    }
}
