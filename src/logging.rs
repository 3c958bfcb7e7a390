//! Log output for the demo binary.
//!
//! The terminal is owned by the TUI, so log lines go to a file. `RUST_LOG`
//! overrides the level chosen from the configuration.

use crate::config::Config;
use crate::error::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter directive for the configured verbosity.
pub fn directive(config: &Config) -> String {
    let level = config.log_level();
    format!("lifecycle_widgets={level},lifecycle_demo={level}")
}

/// Installs the global subscriber writing to `config.log_file`.
pub fn init(config: &Config) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .map_err(|source| Error::LogFile {
            path: config.log_file.clone(),
            source,
        })?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
