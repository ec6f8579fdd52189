//! Clipboard access for share links and copied selections.
//!
//! Tries the OSC 52 escape sequence first (works over SSH), then the system
//! clipboard through `arboard`.

use std::io::Write;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub struct Clipboard;

impl Clipboard {
    /// Copies text to the clipboard. Succeeds if any transport worked.
    pub fn copy(text: &str) -> Result<()> {
        if Self::copy_osc52(text).is_ok() {
            return Ok(());
        }
        Self::copy_system(text)
    }

    fn copy_osc52(text: &str) -> Result<()> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|()| stdout.flush())
            .context("OSC 52 clipboard failed")
    }

    fn copy_system(text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new().context("System clipboard unavailable")?;
        clipboard
            .set_text(text)
            .context("System clipboard failed")
    }
}

/// `ESC ] 52 ; c ; <base64> ESC \` targeting the system clipboard.
fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x1b\\", STANDARD.encode(text))
}
