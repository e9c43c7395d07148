//! urltally Query Engine
//!
//! Answers the two query classes over a [`TemporalIndex`](crate::index::TemporalIndex):
//!
//! - **count**: total accesses under a date prefix
//! - **top N**: most accessed URLs under a date prefix
//!
//! plus a range count between two prefixes of the same granularity.
//!
//! # Prefix shapes
//!
//! ```text
//! 2015                  year
//! 2015-08               month
//! 2015-08-01            day
//! 2015-08-01 00:04      minute
//! 2015-08-01 00         hour
//! 2015-08-01 00:04:59   second
//! ```
//!
//! # Example
//!
//! ```rust
//! use urltally::index::TemporalIndex;
//! use urltally::query::{count_urls, find_top_n, identify_granularity};
//! use chrono::NaiveDateTime;
//!
//! let mut index = TemporalIndex::new();
//! let at = NaiveDateTime::parse_from_str("2015-08-01 00:03:43", "%Y-%m-%d %H:%M:%S").unwrap();
//! index.add(&at, "http://example.com").unwrap();
//!
//! let granularity = identify_granularity("2015-08").unwrap();
//! assert_eq!(count_urls(&index, "2015-08", granularity).unwrap(), 1);
//! assert_eq!(find_top_n(&index, "2015-08", granularity, 1).unwrap().len(), 1);
//! ```

mod error;
mod executor;
mod prefix;

pub use error::{QueryError, QueryResult};
pub use executor::{count_between, count_urls, find_top_n, QueryCount};
pub use prefix::{identify_granularity, parse_size};
