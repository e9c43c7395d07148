//! Log ingestion loop
//!
//! Streams an access log line by line into a [`TemporalIndex`]. Lines that do
//! not parse are logged and skipped; read failures abort the run.

use crate::index::TemporalIndex;
use crate::ingest::error::{IngestError, IngestResult};
use crate::ingest::parser::parse_line;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Outcome of an ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Lines added to the index
    pub indexed: u64,
    /// Lines skipped because they could not be parsed or indexed
    pub rejected: u64,
    pub elapsed: Duration,
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} log lines indexed, {} rejected in {:?}",
            self.indexed, self.rejected, self.elapsed
        )
    }
}

/// Ingest every line of the file at `path`
pub fn ingest_file(index: &mut TemporalIndex, path: &Path) -> IngestResult<IngestReport> {
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!("Start indexing {:?}", path);
    let report = ingest_reader(index, BufReader::new(file), path)?;
    tracing::info!("Indexing {:?}: {}", path, report);
    Ok(report)
}

/// Ingest every line of `reader`; `origin` names the source in errors and logs
pub fn ingest_reader<R: BufRead>(
    index: &mut TemporalIndex,
    mut reader: R,
    origin: &Path,
) -> IngestResult<IngestReport> {
    let start = Instant::now();
    let mut report = IngestReport::default();
    let mut buf = Vec::new();
    let mut line_no = 0u64;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| IngestError::Io {
                path: origin.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let outcome = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim_end_matches(&['\r', '\n'][..]);
                if line.is_empty() {
                    continue;
                }
                parse_line(line).and_then(|record| {
                    index
                        .add(&record.timestamp, &record.url)
                        .map_err(IngestError::from)
                })
            }
            Err(_) => Err(IngestError::InvalidEncoding(
                String::from_utf8_lossy(&buf).trim_end().to_string(),
            )),
        };

        match outcome {
            Ok(()) => report.indexed += 1,
            Err(e) if e.is_line_error() => {
                tracing::warn!(line = line_no, "Skipping line: {}", e);
                report.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    report.elapsed = start.elapsed();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Granularity;
    use crate::query::count_urls;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const LOG: &str = "2015-08-01 00:03:43\thttp://a\n\
                       2015-08-01 00:03:44\thttp://b\n\
                       not a log line\n\
                       \n\
                       2015-08-02 10:00:00\thttp://a\n\
                       2015-13-02 10:00:00\thttp://a\n";

    #[test]
    fn test_ingest_reader_skips_bad_lines() {
        let mut index = TemporalIndex::new();
        let report = ingest_reader(&mut index, Cursor::new(LOG), Path::new("memory")).unwrap();

        assert_eq!(report.indexed, 3);
        assert_eq!(report.rejected, 2);
        assert_eq!(index.records(), 3);
        assert_eq!(count_urls(&index, "2015-08", Granularity::Month), Ok(3));
    }

    #[test]
    fn test_ingest_reader_skips_invalid_utf8() {
        let mut log = b"2015-08-01 00:03:43\thttp://a\n".to_vec();
        log.extend_from_slice(b"2015-08-01 00:03:44\thttp://\xff\xfe\n");
        log.extend_from_slice(b"2015-08-01 00:03:45\thttp://b\r\n");

        let mut index = TemporalIndex::new();
        let report = ingest_reader(&mut index, Cursor::new(log), Path::new("memory")).unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(count_urls(&index, "2015-08-01 00:03", Granularity::Minute), Ok(2));
        assert_eq!(index.url_id("http://b"), Some(1));
    }

    #[test]
    fn test_ingest_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(LOG.as_bytes()).unwrap();

        let mut index = TemporalIndex::new();
        let report = ingest_file(&mut index, file.path()).unwrap();
        assert_eq!(report.indexed, 3);
        assert_eq!(index.stats().distinct_urls, 2);
    }

    #[test]
    fn test_ingest_missing_file() {
        let mut index = TemporalIndex::new();
        let err = ingest_file(&mut index, Path::new("/nonexistent/hn_logs.tsv")).unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
        assert!(!err.is_line_error());
    }
}
