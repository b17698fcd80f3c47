//! Error types for the pv version store.
//!
//! The store returns typed errors and never formats or prints them itself;
//! the CLI layer owns the translation into user-facing messages and exit
//! codes.

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, PvError>;

/// Main error type for pv
#[derive(Debug, Error)]
pub enum PvError {
    /// Prompt or version does not exist
    #[error("{0}")]
    NotFound(String),

    /// Version number outside the prompt's existing range
    #[error("version {version} is out of range for prompt '{prompt}' (valid: 1..={max})")]
    InvalidVersionRange {
        prompt:  String,
        version: i64,
        max:     i64,
    },

    /// Rejected input (empty content, blank tag, empty name)
    #[error("validation error: {0}")]
    Validation(String),

    /// Underlying SQLite failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unresolvable database location
    #[error("configuration error: {0}")]
    Config(String),
}

impl PvError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            PvError::NotFound(_) => "not_found",
            PvError::InvalidVersionRange { .. } => "version_range",
            PvError::Validation(_) => "validation",
            PvError::Storage(_) => "storage",
            PvError::Serde(_) => "serialization",
            PvError::Io(_) => "io",
            PvError::Config(_) => "config",
        }
    }
}
