/// Paragraph structure for Word documents.
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// A paragraph in a Word document.
///
/// Represents a `<w:p>` element. The raw XML bytes are kept so that drawing
/// and formula scans can re-parse the element without another pass over the
/// whole document.
#[derive(Debug, Clone)]
pub struct Paragraph {
    /// The raw XML bytes for this paragraph
    xml_bytes: Vec<u8>,
}

impl Paragraph {
    /// Create a new Paragraph from XML bytes.
    pub fn new(xml_bytes: Vec<u8>) -> Self {
        Self { xml_bytes }
    }

    /// Get the raw XML bytes of this paragraph.
    #[inline]
    pub fn xml_bytes(&self) -> &[u8] {
        &self.xml_bytes
    }

    /// Get the visible text content of this paragraph.
    ///
    /// Concatenates text from `<w:t>` elements only. Math runs (`<m:t>`) are
    /// deliberately excluded so that a paragraph holding nothing but an OMML
    /// formula reads as empty. Tabs and line breaks are folded into the text.
    /// Whitespace inside runs is significant and preserved as-is.
    pub fn text(&self) -> Result<String> {
        let mut reader = Reader::from_reader(&self.xml_bytes[..]);

        let mut result = String::with_capacity(self.xml_bytes.len() / 4);
        let mut in_text_element = false;
        let mut buf = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    // Check the full name to avoid matching m:t (math text).
                    // Only a Start opens a text element; a self-closing
                    // <w:t/> has no content and no matching End.
                    let is_word_text = e.local_name().as_ref() == b"t"
                        && (e.name().as_ref() == b"w:t" || e.name().as_ref() == b"t");
                    if is_word_text {
                        in_text_element = true;
                    } else {
                        match e.name().as_ref() {
                            b"w:tab" | b"tab" => result.push('\t'),
                            b"w:br" | b"br" | b"w:cr" | b"cr" => result.push('\n'),
                            _ => {},
                        }
                    }
                },
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"w:tab" | b"tab" => result.push('\t'),
                    b"w:br" | b"br" | b"w:cr" | b"cr" => result.push('\n'),
                    _ => {},
                },
                Ok(Event::Text(ref e)) if in_text_element => {
                    result.push_str(&crate::xml::text_content(e)?);
                },
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"t" {
                        in_text_element = false;
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(result)
    }

    /// Check whether this paragraph has any visible (non-whitespace) text.
    pub fn has_visible_text(&self) -> Result<bool> {
        Ok(!self.text()?.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_concatenates_runs() {
        let para = Paragraph::new(
            b"<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world.</w:t></w:r></w:p>".to_vec(),
        );
        assert_eq!(para.text().unwrap(), "Hello world.");
        assert!(para.has_visible_text().unwrap());
    }

    #[test]
    fn test_text_excludes_math_runs() {
        let para = Paragraph::new(
            b"<w:p><m:oMath><m:r><m:t>\xce\xb1+\xce\xb2</m:t></m:r></m:oMath></w:p>".to_vec(),
        );
        assert_eq!(para.text().unwrap(), "");
        assert!(!para.has_visible_text().unwrap());
    }

    #[test]
    fn test_text_folds_tabs_and_breaks() {
        let para = Paragraph::new(
            b"<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>".to_vec(),
        );
        assert_eq!(para.text().unwrap(), "a\tb\nc");
    }

    #[test]
    fn test_text_unescapes_entities() {
        let para = Paragraph::new(b"<w:p><w:r><w:t>a &amp; b</w:t></w:r></w:p>".to_vec());
        assert_eq!(para.text().unwrap(), "a & b");
    }

    #[test]
    fn test_text_preserves_run_whitespace() {
        let para = Paragraph::new(
            b"<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t> world </w:t></w:r></w:p>".to_vec(),
        );
        assert_eq!(para.text().unwrap(), "Hello  world ");
    }

    #[test]
    fn test_empty_text_element_does_not_leak_math() {
        let para = Paragraph::new(
            b"<w:p><w:r><w:t/></w:r><m:oMath><m:r><m:t>x+y</m:t></m:r></m:oMath></w:p>".to_vec(),
        );
        assert_eq!(para.text().unwrap(), "");
        assert!(!para.has_visible_text().unwrap());
    }
}
