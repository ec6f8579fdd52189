//! Highlight overlay rendering.
//!
//! The host highlighter returns a flat token stream covering the buffer. The
//! overlay splits tokens at embedded newlines and inserts explicit line
//! breaks, so overlay rows line up one-to-one with buffer rows.

/// Style tag used when no highlighter is available or it fails.
pub const PLAIN_STYLE: &str = "none";

/// A run of source text with a host-defined style tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    pub style: String,
    pub text: String,
}

impl HighlightToken {
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
        }
    }

    /// A single unstyled token.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(PLAIN_STYLE, text)
    }
}

/// One piece of the rendered overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayFragment {
    Styled { style: String, text: String },
    LineBreak,
}

/// Renders a token stream into overlay fragments.
pub fn render(tokens: &[HighlightToken]) -> Vec<OverlayFragment> {
    let mut fragments = Vec::with_capacity(tokens.len());
    for token in tokens {
        for (i, part) in token.text.split('\n').enumerate() {
            if i > 0 {
                fragments.push(OverlayFragment::LineBreak);
            }
            if !part.is_empty() {
                fragments.push(OverlayFragment::Styled {
                    style: token.style.clone(),
                    text: part.to_string(),
                });
            }
        }
    }
    fragments
}

/// Groups overlay fragments into rows. Always returns at least one row.
pub fn overlay_rows(fragments: &[OverlayFragment]) -> Vec<Vec<HighlightToken>> {
    let mut rows = vec![Vec::new()];
    for fragment in fragments {
        match fragment {
            OverlayFragment::LineBreak => rows.push(Vec::new()),
            OverlayFragment::Styled { style, text } => {
                if let Some(row) = rows.last_mut() {
                    row.push(HighlightToken::new(style.clone(), text.clone()));
                }
            }
        }
    }
    rows
}

/// Reassembles the source text from a token stream.
pub fn source_text(tokens: &[HighlightToken]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}
