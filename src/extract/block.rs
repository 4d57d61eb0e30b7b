//! Typed content blocks produced by extraction.

use crate::docx::format::Alignment;
use serde::Serialize;

/// Formatting captured for text and heading blocks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormatInfo {
    /// Resolved style display name (e.g. "Heading 1", "Normal")
    pub style_name: Option<String>,

    /// Paragraph alignment
    pub alignment: Alignment,

    /// Line spacing as a multiple, or points for exact rules
    pub line_spacing: Option<f64>,

    /// First-line indent in points; negative for a hanging indent
    pub first_line_indent: Option<f64>,
}

/// Which edge an anchored drawing is positioned against, per axis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnchorEdge {
    /// Reference frame (e.g. "column", "page", "margin")
    pub relative_from: Option<String>,

    /// Alignment keyword (e.g. "center", "left"), if given
    pub align: Option<String>,

    /// Absolute offset in EMUs, if given
    pub offset: Option<i64>,
}

/// Placement of an extracted image within the page flow.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionInfo {
    /// Inline with the text flow, with extent in EMUs
    Inline {
        width: Option<i64>,
        height: Option<i64>,
    },

    /// Floating, anchored relative to a reference frame
    Floating {
        horizontal: AnchorEdge,
        vertical: AnchorEdge,
    },

    /// Legacy VML shape; the raw style string is kept as-is
    LegacyShape { style: String },

    /// Found only through the relationship fallback scan
    Unknown,
}

/// How a formula was encoded in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaKind {
    /// Office Math Markup Language (m:oMath)
    Omml,

    /// LaTeX-style markers found in plain run text
    Latex,
}

/// One extracted content block, in document order.
///
/// `original_index` is the zero-based position of the body child that
/// produced the block. Several blocks may share an index (a paragraph with
/// both text and images), and indexes may be skipped (body children that
/// produce nothing still count).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        content: String,
        format: FormatInfo,
        original_index: usize,
    },

    Heading {
        content: String,
        level: u32,
        format: FormatInfo,
        original_index: usize,
    },

    Image {
        image_path: String,
        filename: String,
        position: PositionInfo,
        file_size: usize,
        content_type: String,
        original_index: usize,
    },

    Formula {
        content: String,
        kind: FormulaKind,
        format: Option<FormatInfo>,
        original_index: usize,
    },
}

impl ContentBlock {
    /// Get the index of the body child this block came from.
    pub fn original_index(&self) -> usize {
        match self {
            ContentBlock::Text { original_index, .. }
            | ContentBlock::Heading { original_index, .. }
            | ContentBlock::Image { original_index, .. }
            | ContentBlock::Formula { original_index, .. } => *original_index,
        }
    }
}

/// One entry of the heading-only outline.
#[derive(Debug, Clone, Serialize)]
pub struct OutlineEntry {
    pub level: u32,
    pub text: String,
}

/// The full result of extracting a document.
#[derive(Debug, Default, Serialize)]
pub struct ExtractionResult {
    /// Heading blocks projected to `{level, text}`, in emission order
    pub structure: Vec<OutlineEntry>,

    /// All extracted blocks, in emission order
    pub content_blocks: Vec<ContentBlock>,
}
