//! Date prefix recognition
//!
//! Maps a user-supplied prefix such as `2015-08` or `2015-08-01 00:04` to the
//! granularity it addresses.

use crate::index::Granularity;
use crate::query::error::{QueryError, QueryResult};
use regex::Regex;
use std::sync::OnceLock;

/// Supported prefix shapes, in precedence order
const PATTERNS: [(&str, Granularity); 6] = [
    (r"^[0-9]{4}$", Granularity::Year),
    (r"^[0-9]{4}-[0-9]{2}$", Granularity::Month),
    (r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$", Granularity::Day),
    (r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}$", Granularity::Minute),
    (r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}$", Granularity::Hour),
    (r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$", Granularity::Second),
];

/// Compiled [`PATTERNS`], built on first use
fn compiled_patterns() -> QueryResult<&'static [(Regex, Granularity)]> {
    static COMPILED: OnceLock<Result<Vec<(Regex, Granularity)>, regex::Error>> = OnceLock::new();

    COMPILED
        .get_or_init(|| {
            PATTERNS
                .iter()
                .map(|&(pattern, granularity)| Regex::new(pattern).map(|re| (re, granularity)))
                .collect()
        })
        .as_deref()
        .map_err(|e| QueryError::Execution(format!("Invalid prefix pattern: {}", e)))
}

/// Identify the granularity of a date prefix
///
/// The first matching pattern wins.
pub fn identify_granularity(prefix: &str) -> QueryResult<Granularity> {
    compiled_patterns()?
        .iter()
        .find(|(re, _)| re.is_match(prefix))
        .map(|&(_, granularity)| granularity)
        .ok_or_else(|| QueryError::UnrecognizedPrefix(prefix.to_string()))
}

/// Parse the `size` parameter of a top-N query
pub fn parse_size(raw: &str) -> QueryResult<usize> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| QueryError::InvalidSize(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_year() {
        assert_eq!(identify_granularity("2015"), Ok(Granularity::Year));
    }

    #[test]
    fn test_identify_month() {
        assert_eq!(identify_granularity("2015-08"), Ok(Granularity::Month));
    }

    #[test]
    fn test_identify_day() {
        assert_eq!(identify_granularity("2015-08-01"), Ok(Granularity::Day));
    }

    #[test]
    fn test_identify_minute() {
        assert_eq!(
            identify_granularity("2015-08-01 00:04"),
            Ok(Granularity::Minute)
        );
    }

    #[test]
    fn test_identify_hour_and_second() {
        assert_eq!(identify_granularity("2015-08-01 00"), Ok(Granularity::Hour));
        assert_eq!(
            identify_granularity("2015-08-01 00:04:59"),
            Ok(Granularity::Second)
        );
    }

    #[test]
    fn test_identify_fails() {
        for prefix in ["", "15", "2015-8", "2015/08/01", "2015-08-01T00:04", "foo"] {
            assert_eq!(
                identify_granularity(prefix),
                Err(QueryError::UnrecognizedPrefix(prefix.to_string())),
                "{:?}",
                prefix
            );
        }
    }

    #[test]
    fn test_patterns_compile_once() {
        let first = compiled_patterns().unwrap();
        let second = compiled_patterns().unwrap();
        assert_eq!(first.len(), PATTERNS.len());
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("3"), Ok(3));
        assert_eq!(parse_size("0"), Ok(0));
        assert_eq!(parse_size("foo"), Err(QueryError::InvalidSize("foo".into())));
        assert!(parse_size("-1").is_err());
    }
}
