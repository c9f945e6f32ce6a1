//! The ledger facade.
//!
//! [`Ledger`] wraps a [`LedgerStore`] with validation and logging. It is the
//! only path by which the rest of the service reads or writes changes.

use crowdmap_types::{Change, ChangeId, ChangeKind, ChangeSubmission, ReporterSet};

use crate::error::LedgerError;
use crate::filter::ChangeFilter;
use crate::store::{AddOutcome, LedgerStore, LedgerSummary, Retirement};

/// Pending change ledger over a storage backend.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validate a client submission and record it.
    ///
    /// Invalid submissions are rejected before the store is touched.
    pub async fn submit(&self, submission: ChangeSubmission) -> Result<AddOutcome, LedgerError> {
        submission.validate()?;
        let (kind, reporters) = submission.into_parts();
        self.add_change(kind, reporters).await
    }

    /// Record a change, merging its reporters into an existing record with
    /// the same identity when there is one.
    pub async fn add_change(
        &self,
        kind: ChangeKind,
        reporters: ReporterSet,
    ) -> Result<AddOutcome, LedgerError> {
        let change_type = kind.change_type();
        let outcome = self.store.merge_or_insert(kind, reporters).await?;
        match outcome {
            AddOutcome::Inserted { change_id } => {
                tracing::info!(%change_id, %change_type, "change recorded");
            }
            AddOutcome::Merged {
                change_id,
                reporters,
            } => {
                tracing::debug!(%change_id, %change_type, reporters, "change merged");
            }
        }
        Ok(outcome)
    }

    /// Changes seen by at least `times_seen` reporters, ascending by id,
    /// restricted by optional include or exclude lists.
    ///
    /// Supplying both lists fails before the store is queried.
    pub async fn get_changes(
        &self,
        times_seen: usize,
        include: &[ChangeId],
        exclude: &[ChangeId],
    ) -> Result<Vec<Change>, LedgerError> {
        let filter = ChangeFilter::from_lists(include, exclude)?;
        self.changes(times_seen, &filter).await
    }

    /// Changes seen by at least `times_seen` reporters that pass `filter`.
    pub async fn changes(
        &self,
        times_seen: usize,
        filter: &ChangeFilter,
    ) -> Result<Vec<Change>, LedgerError> {
        self.store.scan(times_seen, filter).await
    }

    /// Last id and count of the changes seen by at least `times_seen`
    /// reporters.
    pub async fn summary(&self, times_seen: usize) -> Result<LedgerSummary, LedgerError> {
        self.store.summary(times_seen).await
    }

    /// Remove changes from the ledger. Unknown ids are ignored.
    pub async fn retire(&self, ids: &[ChangeId]) -> Result<u64, LedgerError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let removed = self.store.delete(ids).await?;
        tracing::info!(requested = ids.len(), removed, "changes retired");
        Ok(removed)
    }

    /// Remove changes only if `check` accepts the unfiltered summary, with
    /// the check and the delete serialized against other guarded
    /// retirements on the same storage.
    pub async fn retire_if<F>(&self, ids: &[ChangeId], check: F) -> Result<Retirement, LedgerError>
    where
        F: FnOnce(&LedgerSummary) -> bool + Send,
    {
        let retirement = self.store.retire_if(ids, check).await?;
        match retirement {
            Retirement::Retired { removed, .. } => {
                tracing::info!(requested = ids.len(), removed, "changes retired");
            }
            Retirement::Stale { current } => {
                tracing::debug!(count = current.count, "guarded retirement refused");
            }
        }
        Ok(retirement)
    }
}
