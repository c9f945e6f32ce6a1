//! The persistence seam behind the ledger.
//!
//! A [`LedgerStore`] owns the change records. The one hard requirement on an
//! implementation is that [`merge_or_insert`](LedgerStore::merge_or_insert)
//! is atomic per identity: two concurrent submissions of the same payload
//! must end up as one record carrying both reporter sets. The other is that
//! [`retire_if`](LedgerStore::retire_if) is serialized against every other
//! `retire_if` on the same storage, including callers in other processes.

use std::future::Future;
use std::sync::Arc;

use crowdmap_types::{Change, ChangeId, ChangeKind, ReporterSet};

use crate::error::LedgerError;
use crate::filter::ChangeFilter;

/// What a merge-or-insert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// No record had this identity; a new one was created.
    Inserted {
        /// Id of the new record.
        change_id: ChangeId,
    },
    /// A record with this identity already existed and absorbed the reporters.
    Merged {
        /// Id of the existing record.
        change_id: ChangeId,
        /// Reporter count after the merge.
        reporters: usize,
    },
}

impl AddOutcome {
    /// Id of the record that now holds the submission.
    pub const fn change_id(&self) -> ChangeId {
        match self {
            Self::Inserted { change_id } | Self::Merged { change_id, .. } => *change_id,
        }
    }

    /// Whether a new record was created.
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Inserted { .. })
    }
}

/// Aggregate view of the qualifying changes at a trust threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    /// Highest-ordered qualifying change id.
    pub last: Option<ChangeId>,
    /// Number of qualifying changes.
    pub count: usize,
}

/// What a guarded retirement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retirement {
    /// The check passed and the named records were deleted.
    Retired {
        /// Number of records removed.
        removed: u64,
        /// Unfiltered summary the check was made against.
        checked: LedgerSummary,
    },
    /// The check failed; nothing was deleted.
    Stale {
        /// Unfiltered summary at the time of the check.
        current: LedgerSummary,
    },
}

/// Persistence backend for change records.
pub trait LedgerStore: Send + Sync {
    /// Merge `reporters` into the record whose payload equals `kind`, or
    /// insert a new record with a fresh id when none exists.
    fn merge_or_insert(
        &self,
        kind: ChangeKind,
        reporters: ReporterSet,
    ) -> impl Future<Output = Result<AddOutcome, LedgerError>> + Send;

    /// Records with at least `min_reporters` reporters that pass `filter`,
    /// ascending by change id.
    fn scan(
        &self,
        min_reporters: usize,
        filter: &ChangeFilter,
    ) -> impl Future<Output = Result<Vec<Change>, LedgerError>> + Send;

    /// Last id and count of records with at least `min_reporters` reporters.
    fn summary(
        &self,
        min_reporters: usize,
    ) -> impl Future<Output = Result<LedgerSummary, LedgerError>> + Send;

    /// Delete the named records. Unknown ids are ignored. Returns how many
    /// records were removed.
    fn delete(&self, ids: &[ChangeId]) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Read the unfiltered summary (every record, regardless of reporters),
    /// hand it to `check`, and delete `ids` only if `check` accepts it.
    ///
    /// The read and the delete form one step with respect to other
    /// `retire_if` calls against the same storage.
    fn retire_if<F>(
        &self,
        ids: &[ChangeId],
        check: F,
    ) -> impl Future<Output = Result<Retirement, LedgerError>> + Send
    where
        F: FnOnce(&LedgerSummary) -> bool + Send;
}

/// A shared store, so several ledgers (or services) can sit on one backend.
impl<S: LedgerStore> LedgerStore for Arc<S> {
    fn merge_or_insert(
        &self,
        kind: ChangeKind,
        reporters: ReporterSet,
    ) -> impl Future<Output = Result<AddOutcome, LedgerError>> + Send {
        (**self).merge_or_insert(kind, reporters)
    }

    fn scan(
        &self,
        min_reporters: usize,
        filter: &ChangeFilter,
    ) -> impl Future<Output = Result<Vec<Change>, LedgerError>> + Send {
        (**self).scan(min_reporters, filter)
    }

    fn summary(
        &self,
        min_reporters: usize,
    ) -> impl Future<Output = Result<LedgerSummary, LedgerError>> + Send {
        (**self).summary(min_reporters)
    }

    fn delete(&self, ids: &[ChangeId]) -> impl Future<Output = Result<u64, LedgerError>> + Send {
        (**self).delete(ids)
    }

    fn retire_if<F>(
        &self,
        ids: &[ChangeId],
        check: F,
    ) -> impl Future<Output = Result<Retirement, LedgerError>> + Send
    where
        F: FnOnce(&LedgerSummary) -> bool + Send,
    {
        (**self).retire_if(ids, check)
    }
}
