//! Tracing subscriber setup.
//!
//! The filter honours `RUST_LOG`; otherwise everything at `info` and this crate
//! at `debug`. The TUI owns the terminal, so it logs to a file or not at all.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable naming a log file for the TUI binary.
pub const LOG_FILE_ENV: &str = "BSP_LOG_FILE";

const DEFAULT_FILTER: &str = "info,bullshit_poker=debug";

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum LoggingError {
    #[error("cannot open log file: {0}")]
    File(#[from] std::io::Error),
    #[error("a global subscriber is already installed")]
    AlreadySet,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Log to stderr.
pub fn init_logging() -> Result<(), LoggingError> {
    let subscriber = fmt()
        .with_env_filter(filter())
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|_| LoggingError::AlreadySet)
}

/// Append plain-text logs to `path`.
pub fn init_file_logging(path: &Path) -> Result<(), LoggingError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let subscriber = fmt()
        .with_env_filter(filter())
        .with_target(true)
        .with_thread_ids(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|_| LoggingError::AlreadySet)
}

/// File logging when [`LOG_FILE_ENV`] is set; returns whether it was enabled.
pub fn init_from_env() -> Result<bool, LoggingError> {
    match std::env::var_os(LOG_FILE_ENV) {
        Some(path) if !path.is_empty() => init_file_logging(Path::new(&path)).map(|_| true),
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let _ = init_logging();
        assert!(matches!(init_logging(), Err(LoggingError::AlreadySet)));
    }
}
