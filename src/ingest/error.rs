//! Ingestion error types

use crate::index::IndexError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading access logs
#[derive(Error, Debug)]
pub enum IngestError {
    /// Line is not `<date> <time><TAB><url>`
    #[error("Unable to parse line: {0}")]
    MalformedLine(String),

    /// Line bytes are not valid UTF-8
    #[error("Line is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// Date part of a line is not `YYYY-MM-DD HH:MM:SS`
    #[error("Unable to parse date from: {0}")]
    InvalidTimestamp(String),

    /// Log file could not be opened or read
    #[error("Failed to read log file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Index rejected the record
    #[error("Index error: {0}")]
    Index(#[from] IndexError),
}

impl IngestError {
    /// Whether the error concerns a single line and ingestion can go on
    pub fn is_line_error(&self) -> bool {
        !matches!(self, IngestError::Io { .. })
    }
}

/// Result type for ingestion operations
pub type IngestResult<T> = Result<T, IngestError>;
