//! Small helpers shared by the XML readers.

use crate::error::{Error, Result};
use quick_xml::events::BytesText;

/// Decode a text event and resolve character entities.
pub(crate) fn text_content(e: &BytesText<'_>) -> Result<String> {
    let text = e.unescape().map_err(|err| Error::Xml(err.to_string()))?;
    Ok(text.into_owned())
}
