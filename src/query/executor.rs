//! Query Executor
//!
//! Reads counts back out of a [`TemporalIndex`]:
//!
//! ```text
//! prefix + granularity → key → UrlCounts → total | ranked top N
//! ```
//!
//! A key with no node means no access fell in that bucket; it reads as an
//! empty aggregate rather than an error.

use crate::index::{encode_prefix, Granularity, TemporalIndex, UrlCounts};
use crate::query::error::{QueryError, QueryResult};
use crate::query::prefix::identify_granularity;
use serde::{Deserialize, Serialize};

/// One ranked URL with its access count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCount {
    pub query: String,
    pub count: u64,
}

/// Total accesses recorded under a date prefix
///
/// `granularity` is assumed to match the prefix (e.g. `"2015"` with
/// [`Granularity::Year`]); see [`identify_granularity`].
pub fn count_urls(
    index: &TemporalIndex,
    prefix: &str,
    granularity: Granularity,
) -> QueryResult<u64> {
    let count = lookup(index, prefix, granularity)?.map_or(0, UrlCounts::total);
    tracing::debug!(prefix, %granularity, count, "Counted accesses");
    Ok(count)
}

/// The `n` most accessed URLs under a date prefix, most accessed first
///
/// URLs with equal counts come out in no particular order.
pub fn find_top_n(
    index: &TemporalIndex,
    prefix: &str,
    granularity: Granularity,
    n: usize,
) -> QueryResult<Vec<QueryCount>> {
    let Some(counts) = lookup(index, prefix, granularity)? else {
        return Ok(Vec::new());
    };
    Ok(rank(index, counts, n))
}

/// Total accesses between two prefixes of the same granularity, inclusive
pub fn count_between(index: &TemporalIndex, from: &str, to: &str) -> QueryResult<u64> {
    let granularity = identify_granularity(from)?;
    let to_granularity = identify_granularity(to)?;
    if granularity != to_granularity {
        return Err(QueryError::GranularityMismatch {
            from: granularity,
            to: to_granularity,
        });
    }

    let lo = encode_prefix(from, granularity)?;
    let hi = encode_prefix(to, granularity)?;
    let count = index
        .between(lo, hi, granularity)
        .map_or(0, |counts| counts.total());

    tracing::debug!(from, to, %granularity, count, "Counted accesses in range");
    Ok(count)
}

fn lookup<'a>(
    index: &'a TemporalIndex,
    prefix: &str,
    granularity: Granularity,
) -> QueryResult<Option<&'a UrlCounts>> {
    let key = encode_prefix(prefix, granularity)?;
    Ok(index.counts(key))
}

fn rank(index: &TemporalIndex, counts: &UrlCounts, n: usize) -> Vec<QueryCount> {
    let mut ranked: Vec<QueryCount> = counts
        .iter()
        .filter_map(|(id, count)| {
            index.url(id).map(|url| QueryCount {
                query: url.to_string(),
                count,
            })
        })
        .collect();

    ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}
