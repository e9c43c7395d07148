//! urltally Temporal Index
//!
//! In-memory structures answering "how often was each URL accessed during
//! this year / month / day / hour / minute / second":
//!
//! - **keys**: hierarchical integer keys, one per granularity
//! - **tree**: arena-backed AVL tree keyed by `i64`
//! - **temporal**: the index itself, tree + URL deduplication table
//!
//! # Architecture
//!
//! ```text
//! (2015-08-01 00:03:43, url)
//!        ↓
//! IndexKeys: 6 keys sharing one flat key space
//!        ↓
//! AvlTree<UrlCounts>: insert or bump the URL count under each key
//!        ↓
//! Query: prefix "2015-08" → month key → UrlCounts → total / top N
//! ```

mod error;
pub mod keys;
mod temporal;
pub mod tree;

pub use error::{IndexError, IndexResult};
pub use keys::{encode, encode_prefix, Granularity, IndexKeys};
pub use temporal::{TemporalIndex, UrlCounts, UrlId};
pub use tree::{Aggregate, AvlTree, NodeRef, Role};

use serde::Serialize;

/// Statistics about the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Records added
    pub records: u64,
    /// Distinct URLs seen
    pub distinct_urls: usize,
    /// Keys (tree nodes) across all granularities
    pub keys: usize,
    /// Height of the AVL tree, -1 when empty
    pub tree_height: i64,
}
