//! The set of independent reporters that have observed a change.
//!
//! Reporter count is the trust signal of the ledger. The set only ever grows
//! while a change is live: merging a resubmission is a set union, so the same
//! reporter submitting twice is counted once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Grow-only set of reporter tokens.
///
/// Serializes as a sorted JSON list and collapses duplicates when
/// deserialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReporterSet(BTreeSet<String>);

impl ReporterSet {
    /// Create an empty reporter set.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Create a set containing a single reporter.
    pub fn single(reporter: impl Into<String>) -> Self {
        let mut set = Self::new();
        set.insert(reporter);
        set
    }

    /// Add a reporter. Returns `true` if it was not already present.
    pub fn insert(&mut self, reporter: impl Into<String>) -> bool {
        self.0.insert(reporter.into())
    }

    /// Union `other` into this set and return how many reporters were new.
    pub fn merge(&mut self, other: &Self) -> usize {
        other
            .0
            .iter()
            .filter(|reporter| self.0.insert((*reporter).clone()))
            .count()
    }

    /// Number of distinct reporters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no reporter has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `reporter` is in the set.
    pub fn contains(&self, reporter: &str) -> bool {
        self.0.contains(reporter)
    }

    /// Iterate reporters in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Sorted list form used for persistence.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<String> for ReporterSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for ReporterSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_owned).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_counts_only_new_reporters() {
        let mut stored: ReporterSet = ["alice", "bob"].into_iter().collect();
        let incoming: ReporterSet = ["bob", "carol"].into_iter().collect();
        assert_eq!(stored.merge(&incoming), 1);
        assert_eq!(stored.len(), 3);
    }

    #[test]
    fn merging_same_reporter_twice_is_idempotent() {
        let mut stored = ReporterSet::single("alice");
        let again = ReporterSet::single("alice");
        assert_eq!(stored.merge(&again), 0);
        assert_eq!(stored.merge(&again), 0);
        assert_eq!(stored.len(), 1);
    }

    #[test]
    fn deserializing_collapses_duplicates() {
        let set: ReporterSet =
            serde_json::from_str(r#"["bob", "alice", "bob"]"#).unwrap_or_default();
        assert_eq!(set.to_vec(), vec!["alice".to_owned(), "bob".to_owned()]);
    }
}
