//! Debounced diagnostics layer.
//!
//! Validation runs on every edit, but marks are only drawn once the buffer
//! has been quiet for the debounce delay. An empty diagnostic list clears the
//! layer immediately.

use std::time::{Duration, Instant};

/// How long the buffer must stay unchanged before diagnostics are drawn.
pub const DEFAULT_DIAGNOSTICS_DELAY: Duration = Duration::from_millis(1000);

/// A validation error reported by the backend.
///
/// `start` and `end` are 1-based, inclusive character positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(start: usize, end: usize, message: impl Into<String>) -> Self {
        Self {
            start,
            end,
            message: message.into(),
        }
    }
}

/// A rendered diagnostic, aligned to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMark {
    /// Every character before the marked span, as spaces (newlines kept).
    pub pad: String,
    /// 0-based character offset of the first marked character.
    pub offset: usize,
    /// Number of marked characters.
    pub width: usize,
    pub message: String,
}

impl DiagnosticMark {
    /// Returns true if the character at `offset` falls inside the mark.
    pub fn covers(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.offset + self.width.max(1)
    }
}

/// Builds aligned marks for a buffer and its diagnostics.
pub fn render_marks(text: &str, diagnostics: &[Diagnostic]) -> Vec<DiagnosticMark> {
    diagnostics
        .iter()
        .map(|d| {
            let offset = d.start.saturating_sub(1);
            let pad = text
                .chars()
                .take(offset)
                .map(|c| if c == '\n' { '\n' } else { ' ' })
                .collect();
            DiagnosticMark {
                pad,
                offset,
                width: (d.end + 1).saturating_sub(d.start),
                message: d.message.clone(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
struct PendingRender {
    text: String,
    diagnostics: Vec<Diagnostic>,
    render_at: Instant,
}

/// Diagnostics overlay state with its debounce timer.
#[derive(Debug, Clone)]
pub struct DiagnosticsLayer {
    delay: Duration,
    pending: Option<PendingRender>,
    marks: Vec<DiagnosticMark>,
}

impl Default for DiagnosticsLayer {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_DELAY)
    }
}

impl DiagnosticsLayer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            marks: Vec::new(),
        }
    }

    /// Records the latest validation result for `text`.
    ///
    /// Any pending render is cancelled. Non-empty diagnostics reschedule a
    /// render `delay` after `now`; previously drawn marks stay until then.
    pub fn update(&mut self, text: &str, diagnostics: Vec<Diagnostic>, now: Instant) {
        if diagnostics.is_empty() {
            self.clear();
            return;
        }
        self.pending = Some(PendingRender {
            text: text.to_string(),
            diagnostics,
            render_at: now + self.delay,
        });
    }

    /// Draws the pending diagnostics once their deadline has passed.
    ///
    /// Returns true if the marks changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(pending) = self.pending.take_if(|p| now >= p.render_at) else {
            return false;
        };
        self.marks = render_marks(&pending.text, &pending.diagnostics);
        true
    }

    /// Drops both the drawn marks and any pending render.
    pub fn clear(&mut self) {
        self.pending = None;
        self.marks.clear();
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn marks(&self) -> &[DiagnosticMark] {
        &self.marks
    }

    /// The drawn mark covering a 0-based character offset, if any.
    pub fn mark_at(&self, offset: usize) -> Option<&DiagnosticMark> {
        self.marks.iter().find(|m| m.covers(offset))
    }
}
