//! AgentWatch error types.
//!
//! Only construction can fail: building the pattern catalog, loading
//! configuration and I/O at the CLI edge. Analysis, logging and scoring
//! are infallible once a [`SecurityMonitor`](crate::SecurityMonitor) exists.
//!
//! The `Pattern` variant preserves the underlying `regex::Error` via
//! `#[source]`, so `anyhow` can print the full chain.

use thiserror::Error;

/// A detection rule whose regex failed to compile.
#[derive(Error, Debug, Clone)]
#[error("invalid pattern for rule `{rule}`: {source}")]
pub struct PatternError {
    /// Rule name as given in the catalog or configuration.
    pub rule: String,
    /// Compilation failure reported by the regex engine.
    #[source]
    pub source: regex::Error,
}

/// AgentWatch errors.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A detection rule could not be compiled.
    ///
    /// Fatal for the catalog being built: the engine refuses to run with a
    /// partial rule set.
    #[error("Pattern error: {0}")]
    Pattern(#[source] PatternError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AgentWatch operations
pub type Result<T> = std::result::Result<T, GuardError>;

impl From<PatternError> for GuardError {
    fn from(err: PatternError) -> Self {
        GuardError::Pattern(err)
    }
}

impl From<toml::de::Error> for GuardError {
    fn from(err: toml::de::Error) -> Self {
        GuardError::Config(err.to_string())
    }
}
