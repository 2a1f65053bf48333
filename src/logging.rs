//! Log setup.
//!
//! Logs always go to `typeahead.log` in `$TYPEAHEAD_LOG_DIR` (default: the
//! system temp dir), filtered by `$TYPEAHEAD_LOG`. Headless runs also copy
//! warnings to stderr; the interactive UI owns the terminal, so it does not.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE: &str = "typeahead.log";
const DEFAULT_FILTER: &str = "typeahead=info,typeahead_core=info,warn";

pub fn log_dir() -> PathBuf {
    std::env::var_os("TYPEAHEAD_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(warnings_to_stderr: bool) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir(), LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = warnings_to_stderr
        .then(|| fmt::layer().with_writer(std::io::stderr.with_max_level(Level::WARN)));

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("TYPEAHEAD_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(stderr_layer)
        .try_init();

    guard
}
