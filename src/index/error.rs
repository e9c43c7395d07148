//! Index error types
//!
//! Errors raised while encoding keys or mutating the index tree.

use thiserror::Error;

/// Errors that can occur in the temporal index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// No timestamp (or not enough date components) to derive a key from
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// A date component could not be decoded
    #[error("Cannot decode date component: {fragment}")]
    Decode { fragment: String },

    /// Insert on a key that is already present
    #[error("Key already exists: {0}")]
    KeyExists(i64),

    /// Update on a key that is not present
    #[error("Key not found: {0}")]
    KeyNotFound(i64),
}

impl IndexError {
    pub(crate) fn decode(fragment: impl Into<String>) -> Self {
        IndexError::Decode {
            fragment: fragment.into(),
        }
    }
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;
