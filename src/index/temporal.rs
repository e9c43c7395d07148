//! Temporal Index - per-granularity URL access counts
//!
//! Composes the key encoder, the AVL tree and a URL deduplication table.
//! Every ingested record touches six tree keys (year down to second); each
//! key holds the [`UrlCounts`] observed in that time bucket.
//!
//! ```text
//! add(2015-08-01 00:03:43, "http://a")
//!        ↓
//! url_ids: "http://a" → 0 (first sight)
//!        ↓
//! keys: 20150000000000, 20150800000000, ..., 20150801010444
//!        ↓
//! tree[key][0] += 1   (for each of the six keys)
//! ```

use crate::index::keys::{Granularity, IndexKeys};
use crate::index::tree::{Aggregate, AvlTree};
use crate::index::{IndexResult, IndexStats};
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Dense identifier assigned to each distinct URL
pub type UrlId = u32;

/// Access counts per URL under one key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlCounts(HashMap<UrlId, u64>);

impl UrlCounts {
    /// Counts holding a single observation of `url`
    pub fn single(url: UrlId) -> Self {
        Self(HashMap::from([(url, 1)]))
    }

    /// Record one more access of `url`
    pub fn observe(&mut self, url: UrlId) {
        *self.0.entry(url).or_insert(0) += 1;
    }

    pub fn get(&self, url: UrlId) -> u64 {
        self.0.get(&url).copied().unwrap_or(0)
    }

    /// Total number of accesses, not the number of distinct URLs
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Number of distinct URLs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UrlId, u64)> + '_ {
        self.0.iter().map(|(&id, &count)| (id, count))
    }
}

impl Aggregate for UrlCounts {
    fn merge(&mut self, other: &Self) {
        for (&url, &count) in &other.0 {
            *self.0.entry(url).or_insert(0) += count;
        }
    }
}

/// In-memory index of URL accesses over time
///
/// Nodes and URL ids accumulate for the lifetime of the index; nothing is
/// ever removed.
#[derive(Debug, Default)]
pub struct TemporalIndex {
    tree: AvlTree<UrlCounts>,
    /// URL → id
    url_ids: HashMap<String, UrlId>,
    /// id → URL, the id is the position
    urls: Vec<String>,
    /// Records added so far
    records: u64,
}

impl TemporalIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one access of `url` at `timestamp`
    ///
    /// Keys are derived before anything is mutated, so a rejected timestamp
    /// leaves the index untouched.
    pub fn add(&mut self, timestamp: &NaiveDateTime, url: &str) -> IndexResult<()> {
        let keys = IndexKeys::derive(Some(timestamp))?;
        let url_id = self.intern(url);

        for (_, key) in keys.iter() {
            match self.tree.get_mut(key) {
                Some(counts) => counts.observe(url_id),
                None => self.tree.insert(key, UrlCounts::single(url_id))?,
            }
        }

        self.records += 1;
        tracing::trace!(url_id, second_key = keys.second, "Indexed access");
        Ok(())
    }

    /// Counts stored under an exact key
    pub fn counts(&self, key: i64) -> Option<&UrlCounts> {
        self.tree.get(key)
    }

    /// Union of the counts of every `granularity` key in `[lo, hi]`
    ///
    /// Keys of other granularities that fall inside the window are skipped,
    /// so an access is counted once.
    pub fn between(&self, lo: i64, hi: i64, granularity: Granularity) -> Option<UrlCounts> {
        let mut window = self
            .tree
            .range(lo, hi)
            .filter(|&(key, _)| Granularity::of_key(key) == Some(granularity));

        let (_, first) = window.next()?;
        let mut union = first.clone();
        for (_, counts) in window {
            union.merge(counts);
        }
        Some(union)
    }

    /// URL for an id
    pub fn url(&self, id: UrlId) -> Option<&str> {
        self.urls.get(id as usize).map(String::as_str)
    }

    /// Id for a URL, if it has been seen
    pub fn url_id(&self, url: &str) -> Option<UrlId> {
        self.url_ids.get(url).copied()
    }

    /// Number of records added
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Read-only access to the underlying tree
    pub fn tree(&self) -> &AvlTree<UrlCounts> {
        &self.tree
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records,
            distinct_urls: self.urls.len(),
            keys: self.tree.len(),
            tree_height: self.tree.height(),
        }
    }

    /// Look up or assign the id of a URL
    fn intern(&mut self, url: &str) -> UrlId {
        if let Some(&id) = self.url_ids.get(url) {
            return id;
        }

        let id = self.urls.len() as UrlId;
        self.urls.push(url.to_string());
        self.url_ids.insert(url.to_string(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::keys::encode;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = TemporalIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.records(), 0);
        assert_eq!(index.tree().height(), -1);
        assert!(index.url(0).is_none());
    }

    #[test]
    fn test_add_creates_six_keys() {
        let mut index = TemporalIndex::new();
        let t = ts("2015-08-01 00:03:43");
        index.add(&t, "http://example.com").unwrap();

        assert_eq!(index.tree().len(), 6);
        let id = index.url_id("http://example.com").unwrap();
        assert_eq!(id, 0);
        for granularity in Granularity::ALL {
            let key = encode(&t, granularity).unwrap();
            assert_eq!(index.counts(key).unwrap().get(id), 1);
        }
    }

    #[test]
    fn test_url_ids_are_sequential_per_distinct_url() {
        let mut index = TemporalIndex::new();
        let t = ts("2015-08-01 00:03:43");
        index.add(&t, "a").unwrap();
        index.add(&t, "a").unwrap();
        index.add(&t, "b").unwrap();
        index.add(&t, "a").unwrap();
        index.add(&t, "c").unwrap();

        assert_eq!(index.url_id("a"), Some(0));
        assert_eq!(index.url_id("b"), Some(1));
        assert_eq!(index.url_id("c"), Some(2));
        assert_eq!(index.url(1), Some("b"));
        assert_eq!(index.stats().distinct_urls, 3);
        assert_eq!(index.records(), 5);
    }

    #[test]
    fn test_repeated_adds_increase_counts() {
        let mut index = TemporalIndex::new();
        let t = ts("2015-08-01 00:03:43");
        for _ in 0..5 {
            index.add(&t, "a").unwrap();
        }

        for granularity in Granularity::ALL {
            let key = encode(&t, granularity).unwrap();
            assert_eq!(index.counts(key).unwrap().total(), 5);
        }
        assert_eq!(index.tree().len(), 6);
    }

    #[test]
    fn test_shared_coarse_keys() {
        let mut index = TemporalIndex::new();
        index.add(&ts("2015-08-01 00:03:43"), "a").unwrap();
        index.add(&ts("2015-08-02 10:00:00"), "b").unwrap();

        let month = encode(&ts("2015-08-01 00:00:00"), Granularity::Month).unwrap();
        let counts = index.counts(month).unwrap();
        assert_eq!(counts.total(), 2);
        assert_eq!(counts.len(), 2);

        // year + month shared, the other four keys are distinct per record
        assert_eq!(index.tree().len(), 2 + 4 * 2);
    }

    #[test]
    fn test_rejected_timestamp_leaves_index_untouched() {
        let mut index = TemporalIndex::new();
        let far = chrono::NaiveDate::from_ymd_opt(12000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert!(index.add(&far, "a").is_err());
        assert!(index.is_empty());
        assert!(index.url_id("a").is_none());
    }

    #[test]
    fn test_between_unions_one_granularity() {
        let mut index = TemporalIndex::new();
        index.add(&ts("2015-08-01 10:00:00"), "a").unwrap();
        index.add(&ts("2015-08-01 10:05:00"), "a").unwrap();
        index.add(&ts("2015-08-01 10:05:30"), "b").unwrap();
        index.add(&ts("2015-08-01 11:00:00"), "c").unwrap();

        let lo = encode(&ts("2015-08-01 10:00:00"), Granularity::Minute).unwrap();
        let hi = encode(&ts("2015-08-01 10:59:00"), Granularity::Minute).unwrap();
        let counts = index.between(lo, hi, Granularity::Minute).unwrap();

        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(index.url_id("a").unwrap()), 2);
        assert_eq!(counts.get(index.url_id("c").unwrap()), 0);

        let lo = encode(&ts("2016-01-01 00:00:00"), Granularity::Day).unwrap();
        assert!(index.between(lo, lo + 1_000_000, Granularity::Day).is_none());
    }

    #[test]
    fn test_url_counts_merge() {
        let mut a = UrlCounts::single(0);
        let mut b = UrlCounts::single(0);
        b.observe(1);
        a.merge(&b);
        assert_eq!(a.get(0), 2);
        assert_eq!(a.get(1), 1);
        assert_eq!(a.total(), 3);
    }
}
