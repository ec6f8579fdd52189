//! Configuration management for promptline.
//!
//! Loads configuration from ${PROMPTLINE_HOME}/config.toml with sensible
//! defaults. The resulting [`Config`] is read once when a prompt is built
//! and never changes afterwards.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Whether submissions accumulate or overwrite a single result pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    History,
    Single,
}

/// Placement of the output region relative to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputLocation {
    #[default]
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    pub location: OutputLocation,
}

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for promptline configuration and logs.
    //!
    //! PROMPTLINE_HOME resolution order:
    //! 1. PROMPTLINE_HOME environment variable (if set)
    //! 2. ~/.config/promptline (default)

    use std::path::PathBuf;

    pub fn promptline_home() -> PathBuf {
        if let Ok(home) = std::env::var("PROMPTLINE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".promptline"),
            |h| h.join(".config").join("promptline"),
        )
    }

    pub fn config_path() -> PathBuf {
        promptline_home().join("config.toml")
    }

    pub fn logs_dir() -> PathBuf {
        promptline_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spaces per indentation level
    pub indent: usize,

    pub output: OutputConfig,

    /// Text placed in the prompt at startup (`\n` escapes allowed)
    pub initial_input: Option<String>,

    /// Non-interactive banner record
    pub initial_header: Option<String>,

    /// Submit the initial input at startup
    pub initial_run: bool,

    /// Debounce delay before diagnostics are drawn
    pub diagnostics_delay_ms: u64,

    /// Issue tracker linked from the unexpected-error block
    pub issue_url: String,

    /// Base URL for share links; sharing is off when unset
    pub share_base_url: Option<String>,
}

impl Config {
    pub const DEFAULT_INDENT: usize = 2;
    const DEFAULT_DIAGNOSTICS_DELAY_MS: u64 = 1000;
    const DEFAULT_ISSUE_URL: &str = "https://github.com/dgkf/R/issues";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    pub fn diagnostics_delay(&self) -> Duration {
        Duration::from_millis(self.diagnostics_delay_ms)
    }

    /// The initial input with literal `\n` escapes turned into newlines.
    pub fn initial_input_text(&self) -> Option<String> {
        self.initial_input
            .as_deref()
            .map(|input| input.replace("\\n", "\n"))
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent: Self::DEFAULT_INDENT,
            output: OutputConfig::default(),
            initial_input: None,
            initial_header: None,
            initial_run: false,
            diagnostics_delay_ms: Self::DEFAULT_DIAGNOSTICS_DELAY_MS,
            issue_url: Self::DEFAULT_ISSUE_URL.to_string(),
            share_base_url: None,
        }
    }
}
