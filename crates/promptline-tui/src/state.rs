//! Application state for the terminal host.

use std::cell::Cell;
use std::time::{Duration, Instant};

use promptline_core::Prompt;
use ratatui::layout::Rect;

use crate::selection::{PositionMap, SelectionState};

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    expires_at: Instant,
}

/// Output region scroll position, in lines up from the bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputScroll {
    pub from_bottom: usize,
}

impl OutputScroll {
    pub fn follow(&mut self) {
        self.from_bottom = 0;
    }

    pub fn is_following(&self) -> bool {
        self.from_bottom == 0
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.from_bottom = self.from_bottom.saturating_sub(lines);
    }
}

pub struct AppState {
    pub should_quit: bool,
    pub prompt: Prompt,
    pub selection: SelectionState,
    /// Visible output lines, rebuilt each render.
    pub output_map: PositionMap,
    pub scroll: OutputScroll,
    /// Where the prompt was last drawn, and its first visible row.
    pub prompt_area: Cell<Rect>,
    pub prompt_scroll: Cell<usize>,
    pub status: Option<StatusMessage>,
    pub viewport: (u16, u16),
}

impl AppState {
    pub fn new(prompt: Prompt) -> Self {
        Self {
            should_quit: false,
            prompt,
            selection: SelectionState::new(),
            output_map: PositionMap::new(),
            scroll: OutputScroll::default(),
            prompt_area: Cell::new(Rect::default()),
            prompt_scroll: Cell::new(0),
            status: None,
            viewport: (0, 0),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            expires_at: Instant::now() + STATUS_MESSAGE_TTL,
        });
    }

    /// Drops an expired status message. Returns true if one was dropped.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        self.status.take_if(|s| now >= s.expires_at).is_some()
    }

    /// Whether a timer is due soon and the loop should tick fast.
    pub fn has_pending_timers(&self) -> bool {
        self.selection.has_pending_clear()
            || self.prompt.diagnostics().has_pending()
            || self.status.is_some()
    }
}
