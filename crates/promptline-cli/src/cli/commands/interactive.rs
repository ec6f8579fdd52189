//! Interactive mode: the full-screen prompt.

use anyhow::Result;
use promptline_core::{Backend, Config, Prompt};
use tracing::info;

pub fn run(config: Config, backend: Box<dyn Backend>) -> Result<()> {
    info!(
        mode = ?config.output.mode,
        location = ?config.output.location,
        "starting interactive prompt"
    );
    promptline_tui::run_interactive(Prompt::new(config, backend))
}
