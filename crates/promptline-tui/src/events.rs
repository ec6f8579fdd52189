//! Events consumed by the reducer.

use crossterm::event::Event;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Timer tick; advances debounce and feedback timers.
    Tick,
    /// Current terminal size, sent before other events each loop.
    Frame { width: u16, height: u16 },
    Terminal(Event),
    ClipboardCopied,
    ClipboardFailed,
}
