//! Optimistic-concurrency commits.
//!
//! A commit promotes the pending change set into a new base map. The caller
//! names the raw version it has reviewed; if the server's raw version has
//! moved on, the commit is rejected without touching anything. Otherwise
//! the named changes are retired and the base map is refreshed.
//!
//! The version check and the retirement run inside the ledger store's
//! guarded retirement, which serializes them against every other commit on
//! the same storage, including commits from other processes. A local mutex
//! additionally keeps one service's commit-then-refresh sequences from
//! interleaving. Submissions take neither.

use crowdmap_ledger::{Ledger, LedgerStore, Retirement};
use crowdmap_types::ChangeId;
use tokio::sync::Mutex;

use crate::base_map::BaseMap;
use crate::error::CoreError;
use crate::version::{VersionOracle, format_version};

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Number of changes actually removed from the ledger.
    pub retired: u64,
    /// Raw version the commit was checked against.
    pub previous_version: String,
    /// Raw version after retirement and base map refresh.
    pub new_version: String,
}

/// Serializes commit attempts.
#[derive(Debug, Default)]
pub struct CommitCoordinator {
    lock: Mutex<()>,
}

impl CommitCoordinator {
    /// Create a coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retire `obsolete_ids` if `client_version` still matches the server's
    /// raw version, then refresh the base map.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Forbidden`] if `may_commit` is false; nothing is read.
    /// - [`CoreError::Conflict`] if the versions differ; nothing is changed.
    /// - [`CoreError::BaseMap`] if the refresh fails. The retirement has
    ///   already happened at that point and is not undone.
    pub async fn apply_changes<S: LedgerStore>(
        &self,
        ledger: &Ledger<S>,
        base: &BaseMap,
        may_commit: bool,
        client_version: &str,
        obsolete_ids: &[ChangeId],
    ) -> Result<CommitOutcome, CoreError> {
        if !may_commit {
            tracing::warn!(client_version, "Commit refused: caller may not commit");
            return Err(CoreError::Forbidden);
        }

        let _guard = self.lock.lock().await;
        let oracle = VersionOracle::new(ledger, base);
        let marker = base.marker().await;

        let retirement = ledger
            .retire_if(obsolete_ids, |summary| {
                format_version(&marker, summary) == client_version
            })
            .await?;

        let (retired, server_version) = match retirement {
            Retirement::Retired { removed, checked } => (removed, format_version(&marker, &checked)),
            Retirement::Stale { current } => {
                let server_version = format_version(&marker, &current);
                tracing::info!(
                    client_version,
                    server_version = %server_version,
                    "Commit rejected: version conflict"
                );
                return Err(CoreError::Conflict {
                    client: client_version.to_owned(),
                    server: server_version,
                });
            }
        };

        if let Err(err) = base.refresh().await {
            tracing::error!(
                error = %err,
                retired,
                "Base map refresh failed after retirement"
            );
            return Err(err.into());
        }

        let new_version = oracle.raw_version().await?;
        tracing::info!(
            retired,
            previous_version = %server_version,
            new_version = %new_version,
            "Commit applied"
        );
        Ok(CommitOutcome {
            retired,
            previous_version: server_version,
            new_version,
        })
    }
}
