//! Id filters for change queries.

use std::collections::BTreeSet;

use crowdmap_types::ChangeId;

use crate::error::LedgerError;

/// Restricts a change query by change id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChangeFilter {
    /// Every qualifying change.
    #[default]
    All,
    /// Only the listed changes.
    Include(BTreeSet<ChangeId>),
    /// Every qualifying change except the listed ones.
    Exclude(BTreeSet<ChangeId>),
}

impl ChangeFilter {
    /// Build a filter from optional include and exclude lists.
    ///
    /// An empty list counts as not supplied. Supplying both is rejected.
    pub fn from_lists(include: &[ChangeId], exclude: &[ChangeId]) -> Result<Self, LedgerError> {
        match (include.is_empty(), exclude.is_empty()) {
            (true, true) => Ok(Self::All),
            (false, true) => Ok(Self::Include(include.iter().copied().collect())),
            (true, false) => Ok(Self::Exclude(exclude.iter().copied().collect())),
            (false, false) => Err(LedgerError::ConflictingFilters),
        }
    }

    /// Whether a change with this id passes the filter.
    pub fn matches(&self, id: &ChangeId) -> bool {
        match self {
            Self::All => true,
            Self::Include(ids) => ids.contains(id),
            Self::Exclude(ids) => !ids.contains(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_lists_mean_all() {
        assert_eq!(ChangeFilter::from_lists(&[], &[]).ok(), Some(ChangeFilter::All));
    }

    #[test]
    fn both_lists_conflict() {
        let a = ChangeId::new();
        let b = ChangeId::new();
        let result = ChangeFilter::from_lists(&[a], &[b]);
        assert!(matches!(result, Err(LedgerError::ConflictingFilters)));
    }

    #[test]
    fn include_and_exclude_match() {
        let a = ChangeId::new();
        let b = ChangeId::new();

        let include = ChangeFilter::from_lists(&[a], &[]).ok();
        assert!(include.as_ref().is_some_and(|f| f.matches(&a)));
        assert!(include.as_ref().is_some_and(|f| !f.matches(&b)));

        let exclude = ChangeFilter::from_lists(&[], &[a]).ok();
        assert!(exclude.as_ref().is_some_and(|f| !f.matches(&a)));
        assert!(exclude.as_ref().is_some_and(|f| f.matches(&b)));
    }
}
