//! Error types for lexfind
//!
//! One crate-level error enum covering the four failure classes the search
//! flow can surface: oracle call failures, malformed oracle replies, storage
//! failures, and validation failures. None of these are recovered inside the
//! library; callers decide.

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, LexError>;

/// Errors surfaced by the search flow
#[derive(Debug, Error)]
pub enum LexError {
    /// External oracle call failed (network, auth, quota)
    #[error("Oracle call failed: {0}")]
    Oracle(String),

    /// Oracle replied, but the reply was not the expected JSON shape
    #[error("Failed to parse oracle response: {reason}")]
    Parse {
        reason: String,
        /// Raw reply text, kept for diagnostics
        raw: String,
    },

    /// Storage connection or query failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed input: locator strings, missing metadata fields,
    /// duplicate/missing CRUD targets
    #[error("Validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },
}

impl LexError {
    /// Shorthand for a validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LexError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            LexError::Oracle(_) => "oracle",
            LexError::Parse { .. } => "parse",
            LexError::Storage(_) => "storage",
            LexError::Validation { .. } => "validation",
        }
    }
}

impl From<rusqlite::Error> for LexError {
    fn from(err: rusqlite::Error) -> Self {
        LexError::Storage(err.to_string())
    }
}
