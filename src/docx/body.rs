/// Splitting document.xml into its top-level body children.
use crate::docx::paragraph::Paragraph;
use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One direct child of the `<w:body>` element, in document order.
///
/// Paragraphs carry their full XML for later classification. Standalone
/// graphics and math containers keep their raw bytes too. Everything else
/// (tables, section properties, bookmarks) is kept only as a position marker
/// so index accounting stays exact.
#[derive(Debug)]
pub enum BodyElement {
    /// A `<w:p>` paragraph
    Paragraph(Paragraph),

    /// A standalone `<w:drawing>` directly under the body
    Drawing(Vec<u8>),

    /// A standalone `<w:pict>` directly under the body
    Picture(Vec<u8>),

    /// A standalone `<m:oMath>` or `<m:oMathPara>` directly under the body
    Math(Vec<u8>),

    /// Any other body child
    Other,
}

/// Structural kind of a body child, decided by its tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Paragraph,
    Drawing,
    Picture,
    Math,
    Other,
}

fn classify_tag(name: &[u8]) -> ElementKind {
    match name {
        b"w:p" | b"p" => ElementKind::Paragraph,
        b"w:drawing" | b"drawing" => ElementKind::Drawing,
        b"w:pict" | b"pict" => ElementKind::Picture,
        b"m:oMath" | b"m:oMathPara" | b"oMath" | b"oMathPara" => ElementKind::Math,
        _ => ElementKind::Other,
    }
}

/// Serialize an opening (or self-closing) tag back into `out`.
fn write_tag(out: &mut Vec<u8>, e: &BytesStart<'_>, self_closing: bool) {
    out.push(b'<');
    out.extend_from_slice(e.name().as_ref());
    for attr in e.attributes().flatten() {
        out.push(b' ');
        out.extend_from_slice(attr.key.as_ref());
        out.extend_from_slice(b"=\"");
        out.extend_from_slice(&attr.value);
        out.push(b'"');
    }
    if self_closing {
        out.extend_from_slice(b"/>");
    } else {
        out.push(b'>');
    }
}

/// Split document.xml into its top-level body children.
///
/// Walks the XML in a single streaming pass and re-serializes each direct
/// child of `<w:body>` into its own owned buffer. The element order matches
/// document order exactly, and text inside a captured child is carried over
/// byte for byte so run whitespace survives the round trip.
pub fn body_elements(document_xml: &[u8]) -> Result<Vec<BodyElement>> {
    let mut reader = Reader::from_reader(document_xml);

    let mut elements = Vec::new();
    let mut buf = Vec::with_capacity(2048);

    let mut in_body = false;
    let mut capturing: Option<ElementKind> = None;
    let mut depth = 0usize;
    let mut current_xml = Vec::with_capacity(4096);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if capturing.is_some() {
                    depth += 1;
                    write_tag(&mut current_xml, e, false);
                } else if in_body {
                    capturing = Some(classify_tag(e.name().as_ref()));
                    depth = 1;
                    current_xml.clear();
                    write_tag(&mut current_xml, e, false);
                } else if e.local_name().as_ref() == b"body" {
                    in_body = true;
                }
            },
            Ok(Event::Empty(ref e)) => {
                if capturing.is_some() {
                    write_tag(&mut current_xml, e, true);
                } else if in_body {
                    // Self-closing body child, e.g. an empty <w:p/>
                    let kind = classify_tag(e.name().as_ref());
                    let mut xml = Vec::new();
                    write_tag(&mut xml, e, true);
                    elements.push(finish_element(kind, xml));
                }
            },
            Ok(Event::Text(ref e)) => {
                if capturing.is_some() {
                    current_xml.extend_from_slice(e.as_ref());
                }
            },
            Ok(Event::End(ref e)) => {
                if let Some(kind) = capturing {
                    current_xml.extend_from_slice(b"</");
                    current_xml.extend_from_slice(e.name().as_ref());
                    current_xml.push(b'>');

                    depth -= 1;
                    if depth == 0 {
                        elements.push(finish_element(kind, std::mem::take(&mut current_xml)));
                        capturing = None;
                    }
                } else if in_body && e.local_name().as_ref() == b"body" {
                    break;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
        buf.clear();
    }

    Ok(elements)
}

fn finish_element(kind: ElementKind, xml: Vec<u8>) -> BodyElement {
    match kind {
        ElementKind::Paragraph => BodyElement::Paragraph(Paragraph::new(xml)),
        ElementKind::Drawing => BodyElement::Drawing(xml),
        ElementKind::Picture => BodyElement::Picture(xml),
        ElementKind::Math => BodyElement::Math(xml),
        ElementKind::Other => BodyElement::Other,
    }
}
