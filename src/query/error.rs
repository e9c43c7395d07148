//! Query error types
//!
//! Defines all error conditions that can occur while resolving a date prefix
//! and reading counts back out of the index.

use crate::index::{Granularity, IndexError};
use thiserror::Error;

/// Errors that can occur during query operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Date prefix matches none of the supported shapes
    #[error("Could not identify key type from: {0}")]
    UnrecognizedPrefix(String),

    /// `size` parameter is not a non-negative integer
    #[error("Wrong size parameter: {0}")]
    InvalidSize(String),

    /// Range bounds given at different granularities
    #[error("Range bounds differ in granularity: {from} vs {to}")]
    GranularityMismatch { from: Granularity, to: Granularity },

    /// Key derivation failed
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Query execution failed
    #[error("Execution error: {0}")]
    Execution(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
