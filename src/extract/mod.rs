//! The extraction pipeline: walking a document body and producing an ordered,
//! typed stream of content blocks.
//!
//! Body children are visited in document order and each child advances the
//! index counter exactly once, whether it produces zero blocks or several.
//! Per paragraph, classification runs in a fixed priority: formula beats
//! heading, heading beats plain text, and images are scanned regardless of
//! which textual branch was taken.

pub mod block;
pub mod drawing;
pub mod formula;
pub mod media;

pub use block::{
    AnchorEdge, ContentBlock, ExtractionResult, FormatInfo, FormulaKind, OutlineEntry,
    PositionInfo,
};

use crate::docx::{BodyElement, Package, Paragraph, ParagraphFormat, StyleMap, body_elements};
use crate::error::Result;
use crate::extract::drawing::{ResolvedImage, resolve_images};
use crate::extract::formula::extract_formula;
use crate::extract::media::MediaIndex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Extracts the ordered content blocks of a Word document.
///
/// Images referenced by the document are persisted into `output_dir` as a
/// side effect; the emitted blocks carry their paths.
pub struct DocumentExtractor {
    output_dir: PathBuf,
}

impl DocumentExtractor {
    /// Create an extractor that writes images into `output_dir`.
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Extract content from a document file.
    ///
    /// Only `.docx` files are accepted.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Result<ExtractionResult> {
        let package = Package::open(path)?;
        self.extract_package(&package)
    }

    /// Extract content from an already opened package.
    pub fn extract_package(&self, package: &Package) -> Result<ExtractionResult> {
        let styles = package.styles()?;
        let media = MediaIndex::from_package(package)?;
        log::info!("document carries {} image relationship(s)", media.len());

        let elements = body_elements(package.main_part()?.blob())?;

        let mut blocks = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            match element {
                BodyElement::Paragraph(paragraph) => {
                    self.classify_paragraph(paragraph, &styles, &media, index, &mut blocks)?;
                },
                BodyElement::Drawing(xml) | BodyElement::Picture(xml) => {
                    let mut seen = HashSet::new();
                    for image in resolve_images(xml, &media, &self.output_dir, &mut seen) {
                        blocks.push(image_block(image, index));
                    }
                },
                BodyElement::Math(xml) => {
                    if let Some(found) = extract_formula(xml, "") {
                        blocks.push(ContentBlock::Formula {
                            content: found.content,
                            kind: found.kind,
                            format: None,
                            original_index: index,
                        });
                    }
                },
                BodyElement::Other => {},
            }
        }

        let structure = blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Heading { content, level, .. } => Some(OutlineEntry {
                    level: *level,
                    text: content.clone(),
                }),
                _ => None,
            })
            .collect();

        Ok(ExtractionResult {
            structure,
            content_blocks: blocks,
        })
    }

    /// Classify one paragraph into zero or more blocks at `index`.
    fn classify_paragraph(
        &self,
        paragraph: &Paragraph,
        styles: &StyleMap,
        media: &MediaIndex<'_>,
        index: usize,
        blocks: &mut Vec<ContentBlock>,
    ) -> Result<()> {
        let text = paragraph.text()?;
        let trimmed = text.trim();
        let mut seen = HashSet::new();

        if trimmed.is_empty() {
            // No visible text: the paragraph may still hold images or a
            // standalone formula.
            for image in resolve_images(paragraph.xml_bytes(), media, &self.output_dir, &mut seen)
            {
                blocks.push(image_block(image, index));
            }
            if let Some(found) = extract_formula(paragraph.xml_bytes(), trimmed) {
                blocks.push(ContentBlock::Formula {
                    content: found.content,
                    kind: found.kind,
                    format: None,
                    original_index: index,
                });
            }
            return Ok(());
        }

        let format = format_info(paragraph, styles)?;

        if let Some(found) = extract_formula(paragraph.xml_bytes(), trimmed) {
            blocks.push(ContentBlock::Formula {
                content: found.content,
                kind: found.kind,
                format: Some(format),
                original_index: index,
            });
        } else if let Some(level) = heading_level(format.style_name.as_deref()) {
            blocks.push(ContentBlock::Heading {
                content: trimmed.to_string(),
                level,
                format,
                original_index: index,
            });
        } else {
            blocks.push(ContentBlock::Text {
                content: trimmed.to_string(),
                format,
                original_index: index,
            });
        }

        // Images ride along with whichever textual block was emitted
        for image in resolve_images(paragraph.xml_bytes(), media, &self.output_dir, &mut seen) {
            blocks.push(image_block(image, index));
        }

        Ok(())
    }
}

/// Build the format info for a paragraph, resolving its style name.
fn format_info(paragraph: &Paragraph, styles: &StyleMap) -> Result<FormatInfo> {
    let format = ParagraphFormat::from_paragraph(paragraph)?;
    Ok(FormatInfo {
        style_name: format
            .style_id
            .as_deref()
            .map(|id| styles.resolve(id).to_string()),
        alignment: format.alignment,
        line_spacing: format.line_spacing,
        first_line_indent: format.first_line_indent,
    })
}

/// Parse a heading level from a style name like "Heading 2".
///
/// A name that starts with the heading prefix but whose suffix is not an
/// integer is treated as plain text, not an error.
fn heading_level(style_name: Option<&str>) -> Option<u32> {
    let rest = style_name?.strip_prefix("Heading")?;
    rest.trim().parse::<u32>().ok()
}

fn image_block(image: ResolvedImage, index: usize) -> ContentBlock {
    ContentBlock::Image {
        image_path: image.image_path.display().to_string(),
        filename: image.filename,
        position: image.position,
        file_size: image.file_size,
        content_type: image.content_type,
        original_index: index,
    }
}
