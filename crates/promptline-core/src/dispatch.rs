//! Key dispatch decision table.
//!
//! `dispatch` is pure: it looks at the key, the cursor position and the
//! history size, and picks an [`Action`]. The validity check is a closure so
//! the backend's `validate` only runs for Enter at the end of the buffer.

use crate::keys::{KeyCode, KeyEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    HistoryOlder,
    HistoryNewer,
    Submit,
    SmartNewline,
    SmartBackspace,
    SmartHome,
    BlockDedent,
    Dedent,
    BlockIndent,
    Indent,
    /// Native text-field behavior.
    PassThrough,
}

impl Action {
    /// True for actions that change the buffer or the selection.
    pub fn mutates(self) -> bool {
        !matches!(self, Action::PassThrough)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub action: Action,
    /// Whether the history browsing session ends with this key.
    pub reset_history: bool,
}

/// What the dispatcher needs to know about the prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    pub at_start: bool,
    pub at_end: bool,
    pub has_selection: bool,
    pub history_len: usize,
}

pub fn dispatch(key: &KeyEvent, cx: &Context, is_valid: impl FnOnce() -> bool) -> Dispatch {
    Dispatch {
        action: choose(key, cx, is_valid),
        reset_history: !key.is_history_key(),
    }
}

fn choose(key: &KeyEvent, cx: &Context, is_valid: impl FnOnce() -> bool) -> Action {
    let mods = key.modifiers;
    match key.code {
        KeyCode::Up if cx.at_start && cx.history_len > 0 => Action::HistoryOlder,
        KeyCode::Down if cx.at_end && cx.history_len > 0 => Action::HistoryNewer,
        KeyCode::Enter if mods.shift => Action::SmartNewline,
        KeyCode::Enter if mods.ctrl || mods.meta => Action::Submit,
        KeyCode::Enter if cx.at_end && is_valid() => Action::Submit,
        KeyCode::Enter => Action::SmartNewline,
        KeyCode::Backspace => Action::SmartBackspace,
        KeyCode::Home => Action::SmartHome,
        KeyCode::Left if mods.meta => Action::SmartHome,
        KeyCode::Tab if mods.shift && cx.has_selection => Action::BlockDedent,
        KeyCode::Tab if mods.shift => Action::Dedent,
        KeyCode::Tab if cx.has_selection => Action::BlockIndent,
        KeyCode::Tab => Action::Indent,
        _ => Action::PassThrough,
    }
}
