//! Full-screen terminal host for the promptline prompt widget.

pub mod clipboard;
pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod selection;
pub mod state;
pub mod terminal;
pub mod theme;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use promptline_core::Prompt;
pub use runtime::TuiRuntime;

/// Runs the interactive prompt until the user quits.
pub fn run_interactive(prompt: Prompt) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "Interactive mode requires a terminal.\n\
             Use `promptline eval` for non-interactive evaluation."
        );
    }

    let mut runtime = TuiRuntime::new(prompt)?;
    runtime.run()
}
