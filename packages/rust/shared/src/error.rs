//! Error types for jobscout.
//!
//! Library crates use [`JobScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all jobscout operations.
#[derive(Debug, thiserror::Error)]
pub enum JobScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transient fetch or interaction failure against the page source.
    #[error("network error: {0}")]
    Network(String),

    /// The page source session is gone (auth wall, closed client, lost context).
    #[error("session error: {0}")]
    Session(String),

    /// Regex, selector, or document parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Enumeration produced no identifiers and no manual override was given.
    #[error("no results: {0}")]
    NoResults(String),

    /// A collection job is already running.
    #[error("a collection job is already running")]
    AlreadyRunning,

    /// Tabular export failure.
    #[error("export error: {0}")]
    Export(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, JobScoutError>;

impl JobScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the collector may absorb this error as a failed position.
    ///
    /// Only `Network` failures are transient; everything else ends the run.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
