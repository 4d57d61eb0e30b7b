/// Style definitions from the styles part of a Word document.
use crate::docx::format::attr_value;
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;

/// Map from style ID to human-readable style name.
///
/// Paragraphs reference styles by ID (`<w:pStyle w:val="Heading1"/>`) while
/// heading classification works on the display name ("Heading 1") defined in
/// `/word/styles.xml`.
#[derive(Debug, Default)]
pub struct StyleMap {
    names: HashMap<String, String>,
}

impl StyleMap {
    /// Parse a style map from styles.xml content.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut names = HashMap::new();

        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::with_capacity(1024);
        let mut current_style_id: Option<String> = None;

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match e.local_name().as_ref() {
                        b"style" => {
                            current_style_id = attr_value(e, b"styleId")?;
                        },
                        b"name" => {
                            if let Some(id) = current_style_id.take()
                                && let Some(name) = attr_value(e, b"val")?
                            {
                                names.insert(id, name);
                            }
                        },
                        _ => {},
                    }
                },
                Ok(Event::End(ref e)) => {
                    if e.local_name().as_ref() == b"style" {
                        current_style_id = None;
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(Self { names })
    }

    /// Resolve a style ID to its display name.
    ///
    /// Falls back to the raw ID when styles.xml carries no name for it.
    pub fn resolve<'a>(&'a self, style_id: &'a str) -> &'a str {
        self.names
            .get(style_id)
            .map(String::as_str)
            .unwrap_or(style_id)
    }

    /// Get the number of named styles.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES_XML: &[u8] = br#"<?xml version="1.0"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="Heading 1"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="Heading 2"/>
  </w:style>
  <w:style w:type="character" w:styleId="Emphasis">
    <w:name w:val="Emphasis"/>
  </w:style>
</w:styles>"#;

    #[test]
    fn test_resolve_named_style() {
        let styles = StyleMap::from_xml(STYLES_XML).unwrap();
        assert_eq!(styles.len(), 3);
        assert_eq!(styles.resolve("Heading2"), "Heading 2");
    }

    #[test]
    fn test_resolve_unknown_falls_back_to_id() {
        let styles = StyleMap::from_xml(STYLES_XML).unwrap();
        assert_eq!(styles.resolve("MyCustomStyle"), "MyCustomStyle");
    }
}
