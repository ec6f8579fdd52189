//! File logging.
//!
//! The terminal belongs to the UI, so logs go to
//! `$PROMPTLINE_HOME/logs/promptline.log`. The level comes from
//! `PROMPTLINE_LOG` (an `EnvFilter` directive), defaulting to `info`.

use std::fs;

use promptline_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PROMPTLINE_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global subscriber.
///
/// Logging is best effort: if the log directory cannot be created the
/// program runs without it. Keep the returned guard alive until exit so
/// buffered lines are flushed.
pub fn init() -> Option<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir).ok()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("promptline")
        .filename_suffix("log")
        .build(&dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}
