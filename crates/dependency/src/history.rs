//! Ordered success history and the two searches dependency checks rely on.

use std::collections::btree_set;
use std::collections::BTreeSet;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::record::SuccessRecord;

/// Ordered-set navigation over success records.
///
/// Implement this for whatever container holds a job's history; the resolver
/// never needs more than these two lookups.
pub trait OrderedHistory {
    /// Smallest record ordered at or after `key`.
    fn ceiling(&self, key: &SuccessRecord) -> Option<&SuccessRecord>;

    /// Smallest record ordered strictly after `key`.
    fn higher(&self, key: &SuccessRecord) -> Option<&SuccessRecord>;
}

impl OrderedHistory for BTreeSet<SuccessRecord> {
    fn ceiling(&self, key: &SuccessRecord) -> Option<&SuccessRecord> {
        self.range(key..).next()
    }

    fn higher(&self, key: &SuccessRecord) -> Option<&SuccessRecord> {
        self.range((Bound::Excluded(key), Bound::Unbounded)).next()
    }
}

/// A slice sorted ascending by [`SuccessRecord`] order.
impl OrderedHistory for [SuccessRecord] {
    fn ceiling(&self, key: &SuccessRecord) -> Option<&SuccessRecord> {
        let idx = self.partition_point(|r| r < key);
        self.get(idx)
    }

    fn higher(&self, key: &SuccessRecord) -> Option<&SuccessRecord> {
        let idx = self.partition_point(|r| r <= key);
        self.get(idx)
    }
}

/// Success history of one job, ascending by schedule time.
///
/// At most one record is kept per schedule second; inserting a record whose
/// time is already present leaves the existing record in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: BTreeSet<SuccessRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns `false` if its schedule time was already recorded.
    pub fn insert(&mut self, record: SuccessRecord) -> bool {
        self.records.insert(record)
    }

    pub fn remove(&mut self, record: &SuccessRecord) -> bool {
        self.records.remove(record)
    }

    pub fn contains(&self, record: &SuccessRecord) -> bool {
        self.records.contains(record)
    }

    pub fn first(&self) -> Option<&SuccessRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&SuccessRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, SuccessRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl OrderedHistory for History {
    fn ceiling(&self, key: &SuccessRecord) -> Option<&SuccessRecord> {
        self.records.ceiling(key)
    }

    fn higher(&self, key: &SuccessRecord) -> Option<&SuccessRecord> {
        self.records.higher(key)
    }
}

impl FromIterator<SuccessRecord> for History {
    fn from_iter<I: IntoIterator<Item = SuccessRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl Extend<SuccessRecord> for History {
    fn extend<I: IntoIterator<Item = SuccessRecord>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a SuccessRecord;
    type IntoIter = btree_set::Iter<'a, SuccessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const CRON: &str = "0 0 * * * ?";

    fn record(s: &str) -> SuccessRecord {
        let at = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        SuccessRecord::new(CRON, at).unwrap()
    }

    fn three() -> History {
        [
            record("2019-11-10 01:00:00"),
            record("2019-11-10 02:00:00"),
            record("2019-11-10 04:00:00"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn ceiling_includes_exact_match() {
        let history = three();
        let key = record("2019-11-10 02:00:00");
        assert_eq!(history.ceiling(&key), Some(&record("2019-11-10 02:00:00")));
    }

    #[test]
    fn higher_skips_exact_match() {
        let history = three();
        let key = record("2019-11-10 02:00:00");
        assert_eq!(history.higher(&key), Some(&record("2019-11-10 04:00:00")));
    }

    #[test]
    fn searches_between_and_past_the_end() {
        let history = three();
        let between = record("2019-11-10 03:00:00");
        assert_eq!(history.ceiling(&between), history.higher(&between));
        assert_eq!(history.ceiling(&between), Some(&record("2019-11-10 04:00:00")));

        let past = record("2019-11-10 05:00:00");
        assert_eq!(history.ceiling(&past), None);
        assert_eq!(history.higher(&record("2019-11-10 04:00:00")), None);
    }

    #[test]
    fn empty_history_finds_nothing() {
        let history = History::new();
        let key = record("2019-11-10 02:00:00");
        assert!(history.ceiling(&key).is_none());
        assert!(history.higher(&key).is_none());
    }

    #[test]
    fn sorted_slice_matches_set() {
        let history = three();
        let slice: Vec<SuccessRecord> = history.iter().cloned().collect();
        for probe in ["2019-11-10 00:00:00", "2019-11-10 02:00:00", "2019-11-10 03:30:00"] {
            let key = record(probe);
            assert_eq!(slice.as_slice().ceiling(&key), history.ceiling(&key));
            assert_eq!(slice.as_slice().higher(&key), history.higher(&key));
        }
    }

    #[test]
    fn duplicate_schedule_times_are_not_stored_twice() {
        let mut history = three();
        assert!(!history.insert(record("2019-11-10 02:00:00")));
        assert_eq!(history.len(), 3);
        assert!(history.insert(record("2019-11-10 05:00:00")));
        assert_eq!(history.last(), Some(&record("2019-11-10 05:00:00")));
        assert_eq!(history.first(), Some(&record("2019-11-10 01:00:00")));
    }

    #[test]
    fn remove_and_clear() {
        let mut history = three();
        assert!(history.remove(&record("2019-11-10 01:00:00")));
        assert!(!history.contains(&record("2019-11-10 01:00:00")));
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn serializes_as_array() {
        let history = three();
        let json = serde_json::to_string(&history).unwrap();
        assert!(json.starts_with('['));
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 3);
    }
}
