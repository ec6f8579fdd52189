//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use promptline_core::{Backend, Config, OutputLocation, OutputMode};

use crate::backend::{CommandBackend, EchoBackend};
use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "promptline")]
#[command(version)]
#[command(about = "Terminal REPL prompt with smart indentation, history and diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    prompt_args: PromptArgs,
}

/// Overrides applied on top of the config file.
#[derive(clap::Args, Debug, Clone, Default)]
struct PromptArgs {
    /// Spaces per indentation level
    #[arg(long, global = true, value_name = "N")]
    indent: Option<usize>,

    /// Keep every submission or only the latest output
    #[arg(long, global = true, value_enum)]
    output_mode: Option<ModeArg>,

    /// Show output above or below the prompt
    #[arg(long, global = true, value_enum)]
    output_location: Option<LocationArg>,

    /// Text placed in the prompt at startup (`\n` starts a new line)
    #[arg(long, global = true, value_name = "TEXT")]
    input: Option<String>,

    /// Banner shown at the top of the output
    #[arg(long, global = true, value_name = "TEXT")]
    header: Option<String>,

    /// Submit the initial input right away
    #[arg(long, global = true)]
    run: bool,

    /// Base URL for share links (enables the share marker)
    #[arg(long, global = true, value_name = "URL")]
    share_base_url: Option<String>,

    /// Language backend evaluating submissions
    #[arg(long, global = true, value_enum, default_value_t = BackendKind::Echo)]
    backend: BackendKind,

    /// Shell command for the `command` backend; code is passed on stdin
    #[arg(long = "command", global = true, env = "PROMPTLINE_COMMAND", value_name = "CMD")]
    backend_command: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    History,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LocationArg {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum BackendKind {
    /// Echoes submissions back
    #[default]
    Echo,
    /// Pipes submissions through a shell command
    Command,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::History => OutputMode::History,
            ModeArg::Single => OutputMode::Single,
        }
    }
}

impl From<LocationArg> for OutputLocation {
    fn from(location: LocationArg) -> Self {
        match location {
            LocationArg::Above => OutputLocation::Above,
            LocationArg::Below => OutputLocation::Below,
        }
    }
}

impl PromptArgs {
    /// Applies the flags that were given; flags win over the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(indent) = self.indent {
            config.indent = indent;
        }
        if let Some(mode) = self.output_mode {
            config.output.mode = mode.into();
        }
        if let Some(location) = self.output_location {
            config.output.location = location.into();
        }
        if let Some(input) = &self.input {
            config.initial_input = Some(input.clone());
        }
        if let Some(header) = &self.header {
            config.initial_header = Some(header.clone());
        }
        if self.run {
            config.initial_run = true;
        }
        if let Some(url) = &self.share_base_url {
            config.share_base_url = Some(url.clone());
        }
    }

    fn backend(&self) -> Result<Box<dyn Backend>> {
        match self.backend {
            BackendKind::Echo => Ok(Box::new(EchoBackend)),
            BackendKind::Command => {
                let command = self
                    .backend_command
                    .as_deref()
                    .filter(|c| !c.trim().is_empty())
                    .context("The command backend needs --command (or PROMPTLINE_COMMAND)")?;
                Ok(Box::new(CommandBackend::new(command)))
            }
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Evaluate code once and print the output records
    Eval {
        /// Code to submit
        #[arg(value_name = "CODE")]
        code: String,

        /// Also print a share link for the submitted code
        #[arg(long)]
        share: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let Cli {
        command,
        prompt_args,
    } = cli;

    match command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        Some(Commands::Eval { code, share }) => {
            let (config, backend) = prepare(&prompt_args)?;
            commands::eval::run(config, backend, &code, share)
        }
        // default to interactive mode
        None => {
            let (config, backend) = prepare(&prompt_args)?;
            commands::interactive::run(config, backend)
        }
    }
}

fn prepare(args: &PromptArgs) -> Result<(Config, Box<dyn Backend>)> {
    let mut config = Config::load().context("load config")?;
    args.apply(&mut config);
    Ok((config, args.backend()?))
}
