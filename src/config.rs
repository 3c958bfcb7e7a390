//! Command-line configuration for the demo binary.

use crate::countdown::DEFAULT_SECONDS;
use crate::error::{Error, Result};
use crate::memo::DEFAULT_HEAVY_ITERATIONS;
use clap::Parser;
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::time::Duration;

/// Longest countdown accepted on the command line.
pub const MAX_SECONDS: u32 = 24 * 60 * 60;

static INSTALLED: OnceCell<Config> = OnceCell::new();

/// CLI arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "lifecycle-demo")]
#[command(about = "Terminal pages illustrating state, effect, memo and callback primitives")]
#[command(version)]
pub struct Config {
    /// Seconds on the countdown when it is created or reset
    #[arg(short, long, default_value_t = DEFAULT_SECONDS)]
    pub seconds: u32,

    /// Milliseconds between countdown ticks
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    /// Loop turns spent by each heavy computation on the memo page
    #[arg(long, default_value_t = DEFAULT_HEAVY_ITERATIONS)]
    pub heavy_iterations: u64,

    /// File that receives log output
    #[arg(long, default_value = "lifecycle-demo.log")]
    pub log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seconds: DEFAULT_SECONDS,
            interval_ms: 1000,
            heavy_iterations: DEFAULT_HEAVY_ITERATIONS,
            log_file: PathBuf::from("lifecycle-demo.log"),
            verbose: false,
        }
    }
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Rejects values the widgets cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.seconds == 0 || self.seconds > MAX_SECONDS {
            return Err(Error::InvalidConfig(format!(
                "seconds must be between 1 and {}, got {}",
                MAX_SECONDS, self.seconds
            )));
        }
        if self.interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "interval-ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Tick interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Log level for the verbose flag.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Publishes the configuration for [`crate::app::App`] to pick up.
    pub fn install(self) -> Result<()> {
        self.validate()?;
        INSTALLED.set(self).map_err(|_| Error::AlreadyConfigured)
    }

    /// The installed configuration, or the defaults.
    pub fn current() -> Config {
        INSTALLED.get().cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["lifecycle-demo"]).expect("parse defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.seconds, 10);
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "lifecycle-demo",
            "--seconds",
            "30",
            "--interval-ms",
            "250",
            "-v",
        ])
        .expect("parse flags");
        assert_eq!(config.seconds, 30);
        assert_eq!(config.interval(), Duration::from_millis(250));
        assert_eq!(config.log_level(), "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_seconds() {
        let config = Config {
            seconds: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_huge_countdown() {
        let config = Config {
            seconds: MAX_SECONDS + 1,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
