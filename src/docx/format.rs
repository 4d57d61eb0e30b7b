/// Paragraph-level formatting properties.
use crate::docx::paragraph::Paragraph;
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;

/// Paragraph alignment (justification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
    /// No explicit justification set
    #[default]
    None,
}

impl Alignment {
    /// Map a `w:jc` value to an alignment.
    fn from_jc(val: &str) -> Self {
        match val {
            "left" | "start" => Alignment::Left,
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" | "justify" | "distribute" => Alignment::Justify,
            _ => Alignment::None,
        }
    }
}

/// Formatting properties read from a paragraph's `<w:pPr>` element.
///
/// Word stores spacing and indentation in twentieths of a point (twips);
/// values are converted to points here. Line spacing with rule "auto" is
/// stored in 240ths of a line and converted to a line multiple.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParagraphFormat {
    /// Style ID from `<w:pStyle>`, if any
    pub style_id: Option<String>,

    /// Paragraph alignment from `<w:jc>`
    pub alignment: Alignment,

    /// Line spacing as a multiple of single spacing, or in points for
    /// exact/atLeast rules
    pub line_spacing: Option<f64>,

    /// First-line indent in points; negative for a hanging indent
    pub first_line_indent: Option<f64>,
}

impl ParagraphFormat {
    /// Parse formatting from a paragraph's direct `<w:pPr>` child.
    ///
    /// Only the pPr immediately under the `<w:p>` root is read. Paragraph
    /// properties nested deeper (inside text boxes for example) are ignored.
    pub fn from_paragraph(paragraph: &Paragraph) -> Result<Self> {
        let mut format = Self::default();

        let mut reader = Reader::from_reader(paragraph.xml_bytes());
        reader.config_mut().trim_text(true);

        let mut buf = Vec::with_capacity(512);
        let mut depth = 0usize;
        let mut in_ppr = false;
        let mut done = false;

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    if depth == 2 && e.local_name().as_ref() == b"pPr" && !done {
                        in_ppr = true;
                    } else if in_ppr {
                        format.apply_property(e)?;
                    }
                },
                Ok(Event::Empty(ref e)) => {
                    if in_ppr {
                        format.apply_property(e)?;
                    } else if depth == 1 && e.local_name().as_ref() == b"pPr" && !done {
                        done = true;
                    }
                },
                Ok(Event::End(ref e)) => {
                    if in_ppr && depth == 2 && e.local_name().as_ref() == b"pPr" {
                        in_ppr = false;
                        done = true;
                    }
                    depth = depth.saturating_sub(1);
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(e.to_string())),
                _ => {},
            }
        }

        Ok(format)
    }

    fn apply_property(&mut self, e: &quick_xml::events::BytesStart<'_>) -> Result<()> {
        match e.local_name().as_ref() {
            b"pStyle" => {
                if let Some(val) = attr_value(e, b"val")? {
                    self.style_id = Some(val);
                }
            },
            b"jc" => {
                if let Some(val) = attr_value(e, b"val")? {
                    self.alignment = Alignment::from_jc(&val);
                }
            },
            b"spacing" => {
                let line = attr_value(e, b"line")?;
                let rule = attr_value(e, b"lineRule")?;
                if let Some(line) = line
                    && let Ok(line) = line.parse::<f64>()
                {
                    self.line_spacing = match rule.as_deref() {
                        Some("auto") | None => Some(line / 240.0),
                        _ => Some(line / 20.0),
                    };
                }
            },
            b"ind" => {
                if let Some(first) = attr_value(e, b"firstLine")? {
                    if let Ok(twips) = first.parse::<f64>() {
                        self.first_line_indent = Some(twips / 20.0);
                    }
                } else if let Some(hanging) = attr_value(e, b"hanging")?
                    && let Ok(twips) = hanging.parse::<f64>()
                {
                    self.first_line_indent = Some(-twips / 20.0);
                }
            },
            _ => {},
        }
        Ok(())
    }
}

/// Read a `w:`-namespaced attribute value by its local name.
pub(crate) fn attr_value(
    e: &quick_xml::events::BytesStart<'_>,
    local: &[u8],
) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        // Accept both prefixed (w:val) and bare (val) attribute names
        let matches = key == local
            || (key.len() > local.len()
                && key.ends_with(local)
                && key[key.len() - local.len() - 1] == b':');
        if matches {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_alignment_and_spacing() {
        let para = Paragraph::new(
            br#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/><w:spacing w:line="360" w:lineRule="auto"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#.to_vec(),
        );
        let format = ParagraphFormat::from_paragraph(&para).unwrap();
        assert_eq!(format.style_id.as_deref(), Some("Heading1"));
        assert_eq!(format.alignment, Alignment::Center);
        assert_eq!(format.line_spacing, Some(1.5));
    }

    #[test]
    fn test_exact_spacing_is_points() {
        let para = Paragraph::new(
            br#"<w:p><w:pPr><w:spacing w:line="480" w:lineRule="exact"/></w:pPr></w:p>"#.to_vec(),
        );
        let format = ParagraphFormat::from_paragraph(&para).unwrap();
        assert_eq!(format.line_spacing, Some(24.0));
    }

    #[test]
    fn test_first_line_and_hanging_indent() {
        let para = Paragraph::new(
            br#"<w:p><w:pPr><w:ind w:firstLine="420"/></w:pPr></w:p>"#.to_vec(),
        );
        let format = ParagraphFormat::from_paragraph(&para).unwrap();
        assert_eq!(format.first_line_indent, Some(21.0));

        let para = Paragraph::new(
            br#"<w:p><w:pPr><w:ind w:hanging="200"/></w:pPr></w:p>"#.to_vec(),
        );
        let format = ParagraphFormat::from_paragraph(&para).unwrap();
        assert_eq!(format.first_line_indent, Some(-10.0));
    }

    #[test]
    fn test_nested_ppr_is_ignored() {
        // The pPr inside the text box paragraph must not leak out.
        let para = Paragraph::new(
            br#"<w:p><w:r><w:pict><w:txbxContent><w:p><w:pPr><w:jc w:val="right"/></w:pPr></w:p></w:txbxContent></w:pict></w:r></w:p>"#.to_vec(),
        );
        let format = ParagraphFormat::from_paragraph(&para).unwrap();
        assert_eq!(format.alignment, Alignment::None);
    }

    #[test]
    fn test_defaults_without_ppr() {
        let para = Paragraph::new(b"<w:p><w:r><w:t>plain</w:t></w:r></w:p>".to_vec());
        let format = ParagraphFormat::from_paragraph(&para).unwrap();
        assert!(format.style_id.is_none());
        assert_eq!(format.alignment, Alignment::None);
        assert!(format.line_spacing.is_none());
        assert!(format.first_line_indent.is_none());
    }
}
