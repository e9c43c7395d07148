//! urltally Log Ingestion
//!
//! Turns raw access log text into index records:
//!
//! - **parser**: `<date> <time><TAB><url>` → [`LogRecord`]
//! - **loader**: file / reader → [`TemporalIndex`](crate::index::TemporalIndex)
//!
//! # Example
//!
//! ```rust,no_run
//! use urltally::index::TemporalIndex;
//! use urltally::ingest::ingest_file;
//! use std::path::Path;
//!
//! let mut index = TemporalIndex::new();
//! let report = ingest_file(&mut index, Path::new("./hn_logs.tsv")).unwrap();
//! println!("{}", report);
//! ```

mod error;
mod loader;
mod parser;

pub use error::{IngestError, IngestResult};
pub use loader::{ingest_file, ingest_reader, IngestReport};
pub use parser::{parse_line, LogRecord, DATE_FORMAT};
