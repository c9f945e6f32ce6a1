//! In-process ledger backend.
//!
//! Records live in a [`BTreeMap`] keyed by change id, so iteration order is
//! ledger order. A second map indexes ids by payload for merge matching.
//! Both maps sit behind one [`RwLock`]; merge-or-insert holds the write
//! guard for the whole find-then-write sequence, and a guarded retirement
//! holds it across the summary check and the delete.

use std::collections::{BTreeMap, HashMap};

use crowdmap_types::{Change, ChangeId, ChangeKind, ReporterSet};
use tokio::sync::RwLock;

use crate::error::LedgerError;
use crate::filter::ChangeFilter;
use crate::store::{AddOutcome, LedgerStore, LedgerSummary, Retirement};

#[derive(Debug, Default)]
struct Records {
    by_id: BTreeMap<ChangeId, Change>,
    by_identity: HashMap<ChangeKind, ChangeId>,
}

impl Records {
    fn summary(&self, min_reporters: usize) -> LedgerSummary {
        let mut summary = LedgerSummary::default();
        for change in self
            .by_id
            .values()
            .filter(|change| change.times_seen() >= min_reporters)
        {
            summary.last = Some(change.change_id);
            summary.count = summary.count.saturating_add(1);
        }
        summary
    }

    fn remove(&mut self, ids: &[ChangeId]) -> u64 {
        let mut removed: u64 = 0;
        for id in ids {
            if let Some(change) = self.by_id.remove(id) {
                self.by_identity.remove(&change.kind);
                removed = removed.saturating_add(1);
            }
        }
        removed
    }
}

/// Ledger store held entirely in memory.
///
/// Nothing survives the process; use it for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    records: RwLock<Records>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, regardless of trust.
    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.by_id.is_empty()
    }
}

impl LedgerStore for MemoryLedgerStore {
    async fn merge_or_insert(
        &self,
        kind: ChangeKind,
        reporters: ReporterSet,
    ) -> Result<AddOutcome, LedgerError> {
        let mut guard = self.records.write().await;
        let records = &mut *guard;

        if let Some(&change_id) = records.by_identity.get(&kind)
            && let Some(existing) = records.by_id.get_mut(&change_id)
        {
            existing.reporters.merge(&reporters);
            return Ok(AddOutcome::Merged {
                change_id,
                reporters: existing.reporters.len(),
            });
        }

        let change = Change::new(kind, reporters);
        let change_id = change.change_id;
        records.by_identity.insert(change.kind.clone(), change_id);
        records.by_id.insert(change_id, change);
        Ok(AddOutcome::Inserted { change_id })
    }

    async fn scan(
        &self,
        min_reporters: usize,
        filter: &ChangeFilter,
    ) -> Result<Vec<Change>, LedgerError> {
        let records = self.records.read().await;
        Ok(records
            .by_id
            .values()
            .filter(|change| change.times_seen() >= min_reporters)
            .filter(|change| filter.matches(&change.change_id))
            .cloned()
            .collect())
    }

    async fn summary(&self, min_reporters: usize) -> Result<LedgerSummary, LedgerError> {
        Ok(self.records.read().await.summary(min_reporters))
    }

    async fn delete(&self, ids: &[ChangeId]) -> Result<u64, LedgerError> {
        Ok(self.records.write().await.remove(ids))
    }

    async fn retire_if<F>(&self, ids: &[ChangeId], check: F) -> Result<Retirement, LedgerError>
    where
        F: FnOnce(&LedgerSummary) -> bool + Send,
    {
        let mut records = self.records.write().await;
        let checked = records.summary(0);
        if !check(&checked) {
            return Ok(Retirement::Stale { current: checked });
        }
        let removed = records.remove(ids);
        Ok(Retirement::Retired { removed, checked })
    }
}
