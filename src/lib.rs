//! # urltally
//!
//! URL access log indexing: ingest `(timestamp, url)` records and answer
//! "how many accesses happened in this year / month / day / hour / minute /
//! second" and "which URLs were accessed most in that window".
//!
//! ## Features
//!
//! - **One tree, six granularities**: every timestamp maps to six nested
//!   integer keys sharing a single AVL tree
//! - **Deduplicated URLs**: each distinct URL is stored once and counted by id
//! - **HTTP queries**: count and top-N endpoints with Axum
//!
//! ## Modules
//!
//! - [`index`]: key encoding, AVL tree, temporal index
//! - [`query`]: prefix recognition, counting and ranking
//! - [`ingest`]: log line parsing and file ingestion
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use urltally::index::TemporalIndex;
//! use urltally::ingest::parse_line;
//! use urltally::query::{count_urls, find_top_n, identify_granularity};
//!
//! let mut index = TemporalIndex::new();
//! let record = parse_line("2015-08-01 00:03:43\thttp://example.com").unwrap();
//! index.add(&record.timestamp, &record.url).unwrap();
//!
//! let year = identify_granularity("2015").unwrap();
//! assert_eq!(count_urls(&index, "2015", year).unwrap(), 1);
//!
//! let top = find_top_n(&index, "2015", year, 3).unwrap();
//! assert_eq!(top[0].query, "http://example.com");
//! ```

pub mod api;
pub mod config;
pub mod index;
pub mod ingest;
pub mod query;

// Re-export top-level types for convenience
pub use index::{Granularity, IndexError, IndexResult, IndexStats, TemporalIndex};

pub use query::{QueryCount, QueryError, QueryResult};

pub use ingest::{IngestError, IngestReport, LogRecord};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{ApiConfig, Config, ConfigError, IndexConfig, LoadedConfig, LoggingConfig};
