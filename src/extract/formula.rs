//! Formula detection and extraction.
//!
//! Two unrelated encodings are handled. OMML (`m:oMath`) is the structured
//! math vocabulary; its leaf text runs are collected and common mathematical
//! glyphs are substituted with their LaTeX commands. Free-text LaTeX is
//! detected heuristically from paired delimiters or repeated command tokens.
//! OMML wins when both would match. The substitution is intentionally lossy;
//! it is not a full OMML-to-LaTeX converter.

use crate::error::{Error, Result};
use crate::extract::block::FormulaKind;
use memchr::memmem;
use phf::phf_map;
use quick_xml::Reader;
use quick_xml::events::Event;

/// Glyph to LaTeX command substitutions applied to OMML text.
static MATH_SYMBOLS: phf::Map<char, &'static str> = phf_map! {
    // Greek letters
    'α' => "\\alpha", 'β' => "\\beta", 'γ' => "\\gamma", 'δ' => "\\delta",
    'ε' => "\\epsilon", 'ζ' => "\\zeta", 'η' => "\\eta", 'θ' => "\\theta",
    'ι' => "\\iota", 'κ' => "\\kappa", 'λ' => "\\lambda", 'μ' => "\\mu",
    'ν' => "\\nu", 'ξ' => "\\xi", 'ο' => "o", 'π' => "\\pi",
    'ρ' => "\\rho", 'σ' => "\\sigma", 'τ' => "\\tau", 'υ' => "\\upsilon",
    'φ' => "\\phi", 'χ' => "\\chi", 'ψ' => "\\psi", 'ω' => "\\omega",

    // Operators
    '±' => "\\pm", '×' => "\\times", '÷' => "\\div", '∑' => "\\sum",
    '∏' => "\\prod", '∫' => "\\int", '∂' => "\\partial", '∞' => "\\infty",
    '≠' => "\\neq", '≤' => "\\leq", '≥' => "\\geq", '≈' => "\\approx",
};

/// Paired delimiters that mark a LaTeX formula when both occur in order.
const LATEX_DELIMITERS: [(&str, &str); 5] = [
    ("\\begin{equation}", "\\end{equation}"),
    ("\\begin{align}", "\\end{align}"),
    ("\\[", "\\]"),
    ("$$", "$$"),
    ("$", "$"),
];

/// Command tokens; two or more distinct hits mark a LaTeX formula.
const LATEX_COMMANDS: [&str; 11] = [
    "\\frac", "\\sum", "\\int", "\\prod", "\\alpha", "\\beta", "\\Delta",
    "\\partial", "\\infty", "\\in", "\\subset",
];

/// An extracted formula with the encoding it came from.
#[derive(Debug, Clone)]
pub struct ExtractedFormula {
    pub content: String,
    pub kind: FormulaKind,
}

/// Detect and extract a formula from an element's XML and its visible text.
///
/// Returns at most one formula per element. OMML is tried first; free-text
/// LaTeX detection only runs when no OMML content was found.
pub fn extract_formula(element_xml: &[u8], visible_text: &str) -> Option<ExtractedFormula> {
    if memmem::find(element_xml, b"oMath").is_some() {
        match collect_omml_text(element_xml) {
            Ok(text) if !text.trim().is_empty() => {
                return Some(ExtractedFormula {
                    content: substitute_symbols(&text),
                    kind: FormulaKind::Omml,
                });
            },
            Ok(_) => {},
            Err(err) => {
                // Keep the raw markup rather than losing the formula
                log::error!("OMML extraction failed: {}", err);
                return Some(ExtractedFormula {
                    content: String::from_utf8_lossy(element_xml).into_owned(),
                    kind: FormulaKind::Omml,
                });
            },
        }
    }

    let text = visible_text.trim();
    if !text.is_empty() && contains_latex_formula(text) {
        return Some(ExtractedFormula {
            content: text.to_string(),
            kind: FormulaKind::Latex,
        });
    }

    None
}

/// Concatenate the text of all `m:t` runs inside math containers.
///
/// Run whitespace is preserved as written; spacing inside a formula is
/// significant.
fn collect_omml_text(element_xml: &[u8]) -> Result<String> {
    let mut reader = Reader::from_reader(element_xml);

    let mut text = String::new();
    let mut math_depth = 0usize;
    let mut in_math_text = false;
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"oMath" => math_depth += 1,
                b"t" if math_depth > 0 => in_math_text = true,
                _ => {},
            },
            Ok(Event::Text(ref e)) if in_math_text => {
                text.push_str(&crate::xml::text_content(e)?);
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"oMath" => math_depth = math_depth.saturating_sub(1),
                b"t" => in_math_text = false,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e.to_string())),
            _ => {},
        }
    }

    Ok(text)
}

/// Replace known mathematical glyphs with their LaTeX commands.
fn substitute_symbols(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match MATH_SYMBOLS.get(&ch) {
            Some(cmd) => result.push_str(cmd),
            None => result.push(ch),
        }
    }
    result
}

/// Check whether plain text reads like a LaTeX formula.
fn contains_latex_formula(text: &str) -> bool {
    for (start, end) in LATEX_DELIMITERS {
        if let Some(start_pos) = text.find(start) {
            let after = &text[start_pos + start.len()..];
            if after.contains(end) {
                return true;
            }
        }
    }

    let command_count = LATEX_COMMANDS
        .iter()
        .filter(|cmd| text.contains(*cmd))
        .count();
    command_count >= 2
}
