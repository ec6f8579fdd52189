//! The prompt widget: key handling, submission and output management.
//!
//! A [`Prompt`] owns everything one widget instance needs (buffer, history,
//! overlay, diagnostics timer, output records) and talks to the language
//! through its [`Backend`]. Side effects the host must perform (focusing,
//! scrolling) are queued as [`PromptEffect`]s and drained with
//! [`Prompt::take_effects`].

use std::time::Instant;

use anyhow::Result;
use tracing::{debug, error, warn};
use url::Url;

use crate::backend::Backend;
use crate::config::{Config, OutputMode};
use crate::diagnostics::DiagnosticsLayer;
use crate::dispatch::{self, Action, Context};
use crate::highlight::{self, HighlightToken, OverlayFragment};
use crate::history::{Direction, HistoryLog};
use crate::indent;
use crate::keys::{KeyCode, KeyEvent};
use crate::output::{OutputRegion, RecordContent, RecordId, RecordKind};
use crate::share;
use crate::state::PromptState;

/// Title of the block shown when evaluation fails.
pub const UNEXPECTED_ERROR_TITLE: &str = "Error: An unexpected error was encountered!";
/// Label of the issue link under [`UNEXPECTED_ERROR_TITLE`].
pub const ISSUE_LINK_LABEL: &str = "Why not submit an issue?";

/// Requests from the prompt to its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptEffect {
    /// Give keyboard focus back to the prompt.
    Focus,
    /// Bring a record into view.
    ScrollIntoView(RecordId),
}

/// Label of the key chord that always submits.
pub fn run_hint() -> &'static str {
    if cfg!(target_os = "macos") {
        "Cmd + Enter"
    } else {
        "Ctrl + Enter"
    }
}

pub struct Prompt {
    config: Config,
    backend: Box<dyn Backend>,
    state: PromptState,
    history: HistoryLog,
    overlay: Vec<OverlayFragment>,
    diagnostics: DiagnosticsLayer,
    output: OutputRegion,
    header: Option<String>,
    effects: Vec<PromptEffect>,
}

impl Prompt {
    /// Builds a prompt from its configuration.
    ///
    /// The configured header and initial input are applied, and the initial
    /// input is submitted right away when `initial_run` is set.
    pub fn new(config: Config, backend: impl Backend + 'static) -> Self {
        let mut prompt = Self {
            diagnostics: DiagnosticsLayer::new(config.diagnostics_delay()),
            output: OutputRegion::new(config.output.mode, config.output.location),
            backend: Box::new(backend),
            state: PromptState::new(),
            history: HistoryLog::new(),
            overlay: Vec::new(),
            header: None,
            effects: Vec::new(),
            config,
        };
        prompt.refresh(Instant::now());

        if let Some(header) = prompt.config.initial_header.clone() {
            prompt = prompt.with_initial_header(header);
        }
        if let Some(input) = prompt.config.initial_input_text() {
            prompt = prompt.with_initial_input(&input);
        }
        if prompt.config.initial_run {
            prompt.submit();
        }
        prompt
    }

    /// Places `text` in the prompt if it is still empty.
    #[must_use]
    pub fn with_initial_input(mut self, text: &str) -> Self {
        if self.state.is_empty() {
            self.set(text);
            self.effects.push(PromptEffect::Focus);
        }
        self
    }

    /// Adds a non-interactive banner record, restored by [`Self::clear_output`].
    #[must_use]
    pub fn with_initial_header(mut self, header: impl Into<String>) -> Self {
        let header = header.into();
        self.output
            .push(RecordKind::Output, RecordContent::Text(header.clone()), false);
        self.header = Some(header);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &PromptState {
        &self.state
    }

    pub fn text(&self) -> &str {
        self.state.text()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn overlay(&self) -> &[OverlayFragment] {
        &self.overlay
    }

    /// Overlay grouped into rows, one per buffer row.
    pub fn overlay_rows(&self) -> Vec<Vec<HighlightToken>> {
        highlight::overlay_rows(&self.overlay)
    }

    pub fn diagnostics(&self) -> &DiagnosticsLayer {
        &self.diagnostics
    }

    pub fn output(&self) -> &OutputRegion {
        &self.output
    }

    pub fn take_effects(&mut self) -> Vec<PromptEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Replaces the buffer; the cursor ends up at the end.
    pub fn set(&mut self, text: &str) {
        self.state.set(text);
        self.refresh(Instant::now());
    }

    /// Empties the buffer and ends any history browsing session.
    pub fn clear(&mut self) {
        self.state.clear();
        self.history.reset();
        self.refresh(Instant::now());
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.state.set_cursor(pos);
    }

    /// Ends history browsing so the next Up starts at the newest entry.
    pub fn end_history_session(&mut self) {
        self.history.reset();
    }

    /// Inserts text at the cursor as if typed (used for pastes).
    pub fn insert(&mut self, text: &str) {
        self.history.reset();
        self.state.insert_str(text);
        self.refresh(Instant::now());
    }

    /// Handles one key press.
    pub fn handle_key(&mut self, key: &KeyEvent) {
        let cx = Context {
            at_start: self.state.is_at_start(),
            at_end: self.state.is_at_end(),
            has_selection: self.state.has_selection(),
            history_len: self.history.len(),
        };
        let decision = dispatch::dispatch(key, &cx, || self.is_ready());
        debug!(?key, action = ?decision.action, "dispatch");

        if decision.reset_history {
            self.history.reset();
        }

        let before = self.state.text().to_string();
        let unit = self.config.indent;
        let snapshot = self.state.snapshot();
        match decision.action {
            Action::HistoryOlder => {
                if let Some(entry) = self.history.navigate(Direction::Older) {
                    let entry = entry.to_string();
                    self.state.set(&entry);
                    self.state.set_cursor(0);
                }
            }
            Action::HistoryNewer => {
                if let Some(entry) = self.history.navigate(Direction::Newer) {
                    let entry = entry.to_string();
                    self.state.set(&entry);
                }
            }
            Action::Submit => {
                self.submit();
                return;
            }
            Action::SmartNewline => self.state.apply(indent::smart_newline(&snapshot, unit)),
            Action::SmartBackspace => self.state.apply(indent::smart_backspace(&snapshot, unit)),
            Action::SmartHome => self.state.apply(indent::smart_home(&snapshot)),
            Action::BlockDedent => self.state.apply(indent::block_dedent(&snapshot, unit)),
            Action::Dedent => self.state.apply(indent::dedent(&snapshot, unit)),
            Action::BlockIndent => self.state.apply(indent::block_indent(&snapshot, unit)),
            Action::Indent => self.state.apply(indent::indent(&snapshot, unit)),
            Action::PassThrough => self.pass_through(key),
        }

        if decision.action.mutates() || self.state.text() != before {
            self.refresh(Instant::now());
        }
    }

    /// Submits the current buffer.
    pub fn submit(&mut self) {
        let code = self.state.text().to_string();
        self.run(&code);
    }

    /// Evaluates `code` and records its output.
    ///
    /// Whitespace-only code just clears the prompt. Evaluation errors are
    /// logged and replaced by a generic error record.
    pub fn run(&mut self, code: &str) {
        if code.trim().is_empty() {
            self.clear();
            return;
        }

        self.history.push(code);
        let mode = self.output.mode();
        if mode == OutputMode::History {
            let tokens = self.highlight_tokens(code);
            self.output
                .push(RecordKind::Input, RecordContent::Highlighted(tokens), true);
            self.clear();
        }

        let id = self
            .output
            .push(RecordKind::Output, RecordContent::Text(String::new()), true);
        let output = &mut self.output;
        let result = self
            .backend
            .evaluate(code, &mut |chunk: &str| output.append_text(id, chunk));

        if mode == OutputMode::Single {
            self.output.retain_only(id);
        }
        match result {
            Ok(value) => self.output.append_text(id, &value),
            Err(err) => {
                error!("Evaluation failed: {err:#}");
                self.output.replace(
                    id,
                    RecordKind::Error,
                    RecordContent::UnexpectedError {
                        title: UNEXPECTED_ERROR_TITLE.to_string(),
                        issue_url: self.config.issue_url.clone(),
                    },
                );
            }
        }
        self.effects.push(PromptEffect::ScrollIntoView(id));

        if mode == OutputMode::Single {
            self.clear();
        }
        self.effects.push(PromptEffect::Focus);
    }

    /// Copies a record back into the prompt.
    ///
    /// Ignored while the host has a non-empty text selection, and for the
    /// header and error records. Returns true if the buffer changed.
    pub fn recall(&mut self, id: RecordId, selection_active: bool) -> bool {
        if selection_active {
            return false;
        }
        let Some(record) = self
            .output
            .get(id)
            .filter(|r| r.interactive && r.kind != RecordKind::Error)
        else {
            return false;
        };

        let text = record.text();
        self.set(&text);
        self.effects.push(PromptEffect::Focus);
        true
    }

    /// Share link for a record, if sharing is configured.
    pub fn share_url(&self, id: RecordId) -> Result<Option<Url>> {
        let Some(base) = self.config.share_base_url.as_deref() else {
            return Ok(None);
        };
        let Some(record) = self.output.get(id) else {
            return Ok(None);
        };
        share::share_url(base, &record.text()).map(Some)
    }

    pub fn can_share(&self) -> bool {
        self.config.share_base_url.is_some()
    }

    /// Empties the output region, keeping the header.
    pub fn clear_output(&mut self) {
        self.output.clear();
        if let Some(header) = self.header.clone() {
            self.output
                .push(RecordKind::Output, RecordContent::Text(header), false);
        }
    }

    /// Advances timers. Returns true if the diagnostics changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.diagnostics.poll(now)
    }

    /// Whether the backend accepts the buffer as complete.
    fn is_ready(&self) -> bool {
        match self.backend.validate(self.state.text()) {
            Ok(diagnostics) => diagnostics.is_empty(),
            Err(err) => {
                warn!("Validation failed: {err:#}");
                false
            }
        }
    }

    fn pass_through(&mut self, key: &KeyEvent) {
        let mods = key.modifiers;
        let extend = mods.shift;
        match key.code {
            KeyCode::Char('a') if mods.ctrl || mods.meta => self.state.select_all(),
            KeyCode::Char(c) if !mods.ctrl && !mods.meta && !mods.alt => {
                let mut buf = [0u8; 4];
                self.state.insert_str(c.encode_utf8(&mut buf));
            }
            KeyCode::Left => self.state.move_left(extend),
            KeyCode::Right => self.state.move_right(extend),
            KeyCode::Up => self.state.move_up(extend),
            KeyCode::Down => self.state.move_down(extend),
            KeyCode::End => self.state.move_line_end(extend),
            KeyCode::Delete => self.state.delete_forward(),
            _ => {}
        }
    }

    /// Re-renders the highlight overlay and reschedules diagnostics.
    fn refresh(&mut self, now: Instant) {
        let tokens = self.highlight_tokens(self.state.text());
        self.overlay = highlight::render(&tokens);

        match self.backend.validate(self.state.text()) {
            Ok(diagnostics) => self.diagnostics.update(self.state.text(), diagnostics, now),
            Err(err) => {
                warn!("Validation failed: {err:#}");
                self.diagnostics.clear();
            }
        }
    }

    fn highlight_tokens(&self, code: &str) -> Vec<HighlightToken> {
        match self.backend.highlight(code) {
            Ok(tokens) if highlight::source_text(&tokens) == code => tokens,
            Ok(_) => {
                warn!("Highlighter tokens do not cover the input; showing it unstyled");
                vec![HighlightToken::plain(code)]
            }
            Err(err) => {
                warn!("Highlighting failed: {err:#}");
                vec![HighlightToken::plain(code)]
            }
        }
    }
}
