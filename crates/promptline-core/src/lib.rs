//! Editing and state engine for an embeddable REPL-style code prompt.
//!
//! The crate is UI-agnostic: hosts translate their key events into
//! [`KeyEvent`], feed them to a [`Prompt`], and draw the prompt's buffer,
//! highlight overlay, diagnostics and output region however they like.
//!
//! Language support comes entirely from a host-supplied [`Backend`].

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod highlight;
pub mod history;
pub mod indent;
pub mod keys;
pub mod output;
pub mod prompt;
pub mod share;
pub mod state;
mod text;

pub use backend::Backend;
pub use config::{Config, OutputLocation, OutputMode};
pub use diagnostics::{Diagnostic, DiagnosticMark, DiagnosticsLayer};
pub use dispatch::{Action, Dispatch};
pub use highlight::{HighlightToken, OverlayFragment};
pub use history::{Direction, HistoryLog};
pub use indent::Edit;
pub use keys::{KeyCode, KeyEvent, Modifiers};
pub use output::{OutputRecord, OutputRegion, RecordContent, RecordId, RecordKind};
pub use prompt::{Prompt, PromptEffect, run_hint};
pub use state::PromptState;
