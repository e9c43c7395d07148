//! Access log line parser
//!
//! Lines look like `2015-08-01 00:03:43<TAB>http%3A%2F%2Fexample.com`. The URL
//! is kept verbatim, encoded or not.

use crate::ingest::error::{IngestError, IngestResult};
use chrono::NaiveDateTime;

/// Timestamp layout of a log line
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A parsed log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub url: String,
}

/// Parse one `<date> <time><TAB><url>` line
pub fn parse_line(line: &str) -> IngestResult<LogRecord> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = line.split('\t');

    let (Some(date), Some(url), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(IngestError::MalformedLine(line.to_string()));
    };

    let timestamp = NaiveDateTime::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| IngestError::InvalidTimestamp(date.to_string()))?;

    Ok(LogRecord {
        timestamp,
        url: url.to_string(),
    })
}
