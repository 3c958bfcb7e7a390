//! Crate error type.

use std::path::PathBuf;

/// Errors raised while configuring or running the demo.
///
/// The widgets themselves have no failure paths; these cover the ambient
/// setup around them.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The log file could not be opened.
    #[error("cannot open log file {}: {source}", path.display())]
    LogFile {
        /// The path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A global log subscriber was already installed.
    #[error("cannot install logger: {0}")]
    Logging(String),

    /// The configuration was published twice.
    #[error("configuration already installed")]
    AlreadyConfigured,

    /// The terminal program failed.
    #[error("terminal program failed: {0}")]
    Runtime(String),
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::InvalidConfig("seconds must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: seconds must be at least 1"
        );

        let err = Error::LogFile {
            path: PathBuf::from("/nope/demo.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().starts_with("cannot open log file /nope/demo.log"));
    }
}
