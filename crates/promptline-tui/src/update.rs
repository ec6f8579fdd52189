//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use crossterm::event::{
    Event, KeyCode as TermKeyCode, KeyEvent as TermKeyEvent, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use promptline_core::{KeyCode, KeyEvent, Modifiers, PromptEffect};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthChar;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render::PROMPT_PREFIX;
use crate::state::{AppState, StatusKind};

/// Lines moved per mouse wheel step.
const SCROLL_STEP: usize = 3;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            let now = Instant::now();
            app.prompt.tick(now);
            app.selection.check_and_clear(now);
            app.expire_status(now);
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.viewport = (width, height);
            vec![]
        }
        UiEvent::Terminal(event) => handle_terminal_event(app, event),
        UiEvent::ClipboardCopied => vec![],
        UiEvent::ClipboardFailed => {
            app.set_status("Could not access the clipboard", StatusKind::Error);
            vec![]
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    let effects = match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Paste(text) => {
            app.prompt.insert(&text.replace("\r\n", "\n").replace('\r', "\n"));
            vec![]
        }
        _ => vec![],
    };
    apply_prompt_effects(app);
    effects
}

fn handle_key(app: &mut AppState, key: TermKeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        TermKeyCode::Char('c') if ctrl => {
            if app.prompt.text().is_empty() {
                return vec![UiEffect::Quit];
            }
            app.prompt.clear();
        }
        TermKeyCode::Char('l') if ctrl => {
            app.prompt.end_history_session();
            app.prompt.clear_output();
        }
        TermKeyCode::Esc => {
            app.prompt.end_history_session();
            app.selection.clear();
        }
        _ => {
            if let Some(key) = to_prompt_key(key) {
                app.prompt.handle_key(&key);
            }
        }
    }
    vec![]
}

/// Translates a crossterm key into the prompt's key model.
///
/// Alt+Enter and Ctrl+J insert a newline, for terminals that cannot report
/// Shift+Enter.
pub fn to_prompt_key(key: TermKeyEvent) -> Option<KeyEvent> {
    let mods = key.modifiers;
    let mut modifiers = Modifiers {
        shift: mods.contains(KeyModifiers::SHIFT),
        ctrl: mods.contains(KeyModifiers::CONTROL),
        alt: mods.contains(KeyModifiers::ALT),
        meta: mods.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };

    let code = match key.code {
        TermKeyCode::Up => KeyCode::Up,
        TermKeyCode::Down => KeyCode::Down,
        TermKeyCode::Left => KeyCode::Left,
        TermKeyCode::Right => KeyCode::Right,
        TermKeyCode::Enter if modifiers.alt => {
            modifiers = Modifiers::SHIFT;
            KeyCode::Enter
        }
        TermKeyCode::Char('j') if modifiers.ctrl => {
            modifiers = Modifiers::SHIFT;
            KeyCode::Enter
        }
        TermKeyCode::Enter => KeyCode::Enter,
        TermKeyCode::Backspace => KeyCode::Backspace,
        TermKeyCode::Delete => KeyCode::Delete,
        TermKeyCode::Home => KeyCode::Home,
        TermKeyCode::End => KeyCode::End,
        TermKeyCode::Tab => KeyCode::Tab,
        TermKeyCode::BackTab => {
            modifiers.shift = true;
            KeyCode::Tab
        }
        TermKeyCode::Char(c) => {
            // Shift is already folded into the character.
            modifiers.shift = false;
            KeyCode::Char(c)
        }
        _ => return None,
    };
    Some(KeyEvent::new(code, modifiers))
}

fn handle_mouse(app: &mut AppState, mouse: MouseEvent) -> Vec<UiEffect> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some(pos) = app.output_map.hit(mouse.column, mouse.row) {
                app.selection.start(pos);
            } else {
                app.selection.clear();
                place_prompt_cursor(app, mouse.column, mouse.row);
            }
            vec![]
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.selection.is_selecting
                && let Some(pos) = app.output_map.hit(mouse.column, mouse.row)
            {
                app.selection.extend(pos);
            }
            vec![]
        }
        MouseEventKind::Up(MouseButton::Left) => finish_click(app, mouse),
        MouseEventKind::ScrollUp => {
            app.scroll.scroll_up(SCROLL_STEP);
            app.scroll.from_bottom = app.scroll.from_bottom.min(app.output_map.max_scroll());
            app.selection.clear();
            vec![]
        }
        MouseEventKind::ScrollDown => {
            app.scroll.scroll_down(SCROLL_STEP);
            app.selection.clear();
            vec![]
        }
        _ => vec![],
    }
}

/// Ends a press in the output region.
///
/// A drag copies the selected text. A plain click on the share marker copies
/// a share link; anywhere else on a record it recalls the record.
fn finish_click(app: &mut AppState, mouse: MouseEvent) -> Vec<UiEffect> {
    if !app.selection.is_selecting {
        return vec![];
    }
    app.selection.finish();

    let selection_active = app.selection.is_non_empty();
    if selection_active && let Some((start, end)) = app.selection.get_range() {
        let text = app.output_map.get_text_range(start, end);
        app.selection.schedule_clear();
        return vec![UiEffect::CopyToClipboard { text }];
    }
    app.selection.clear();

    let Some(pos) = app.output_map.hit(mouse.column, mouse.row) else {
        return vec![];
    };
    let Some(mapping) = app.output_map.get(pos.line) else {
        return vec![];
    };
    let Some(id) = mapping.record else {
        return vec![];
    };

    if mapping.is_share_hit(pos.column) {
        return match app.prompt.share_url(id) {
            Ok(Some(url)) => {
                app.set_status("Share link copied", StatusKind::Info);
                vec![UiEffect::CopyToClipboard {
                    text: url.to_string(),
                }]
            }
            Ok(None) => vec![],
            Err(err) => {
                warn!("Failed to build share link: {err:#}");
                app.set_status("Could not build share link", StatusKind::Error);
                vec![]
            }
        };
    }

    if app.prompt.recall(id, selection_active) {
        debug!(?id, "recalled record");
    }
    vec![]
}

/// Moves the prompt cursor to a clicked cell inside the prompt.
fn place_prompt_cursor(app: &mut AppState, x: u16, y: u16) {
    let area = app.prompt_area.get();
    if x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
        return;
    }

    let row = usize::from(y - area.y) + app.prompt_scroll.get();
    let prefix = PROMPT_PREFIX.len();
    let target_width = usize::from(x - area.x).saturating_sub(prefix);

    let lines = app.prompt.state().lines();
    let row = row.min(lines.len().saturating_sub(1));
    let offset: usize = lines[..row].iter().map(|l| l.chars().count() + 1).sum();
    let mut used = 0;
    let mut column = 0;
    for c in lines.get(row).copied().unwrap_or("").chars() {
        used += c.width().unwrap_or(0);
        if used > target_width {
            break;
        }
        column += 1;
    }
    app.prompt.set_cursor(offset + column);
}

fn apply_prompt_effects(app: &mut AppState) {
    for effect in app.prompt.take_effects() {
        match effect {
            PromptEffect::ScrollIntoView(_) => app.scroll.follow(),
            // The prompt is the only focus target in a terminal.
            PromptEffect::Focus => {}
        }
    }
}
