//! The operations the service exposes to its callers.
//!
//! [`CrowdmapService`] owns the ledger, the base map, and the commit
//! coordinator, and wires the version oracle and materializer over them.
//! Every dependency is passed in at construction, so tests can run it over
//! an in-memory ledger and a local base map.

use std::path::PathBuf;

use crowdmap_ledger::{AddOutcome, ChangeFilter, Ledger, LedgerStore};
use crowdmap_types::{ChangeId, ChangeSubmission, ChangeView, MapFormat};

use crate::base_map::{BaseMap, BaseSnapshot};
use crate::commit::{CommitCoordinator, CommitOutcome};
use crate::error::CoreError;
use crate::materialize::{Materialized, Materializer, RenderedMap};
use crate::version::VersionOracle;

/// Changes at a threshold together with the versions they correspond to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeListing {
    /// Qualifying changes, ascending by id.
    pub changes: Vec<ChangeView>,
    /// Version at the requested threshold.
    pub version: String,
    /// Version over every pending change.
    pub raw_version: String,
}

/// The map change service.
pub struct CrowdmapService<S> {
    ledger: Ledger<S>,
    base: BaseMap,
    commits: CommitCoordinator,
    scratch_dir: PathBuf,
}

impl<S: LedgerStore> CrowdmapService<S> {
    /// Assemble the service from its parts.
    pub fn new(ledger: Ledger<S>, base: BaseMap, scratch_dir: PathBuf) -> Self {
        Self {
            ledger,
            base,
            commits: CommitCoordinator::new(),
            scratch_dir,
        }
    }

    /// The change ledger.
    pub const fn ledger(&self) -> &Ledger<S> {
        &self.ledger
    }

    /// The base map.
    pub const fn base(&self) -> &BaseMap {
        &self.base
    }

    /// Record a client submission.
    pub async fn submit(&self, submission: ChangeSubmission) -> Result<AddOutcome, CoreError> {
        Ok(self.ledger.submit(submission).await?)
    }

    /// Changes seen by at least `times_seen` reporters, with version
    /// strings.
    ///
    /// Supplying both `include` and `exclude` is a validation error and
    /// reads nothing.
    pub async fn query(
        &self,
        times_seen: usize,
        include: &[ChangeId],
        exclude: &[ChangeId],
    ) -> Result<ChangeListing, CoreError> {
        let filter = ChangeFilter::from_lists(include, exclude)?;
        let changes = self.ledger.changes(times_seen, &filter).await?;
        let oracle = self.oracle();
        Ok(ChangeListing {
            changes: changes.iter().map(crowdmap_types::Change::view).collect(),
            version: oracle.version(times_seen).await?,
            raw_version: oracle.raw_version().await?,
        })
    }

    /// Apply qualifying changes to the base map.
    pub async fn materialize(
        &self,
        times_seen: usize,
        include: &[ChangeId],
        exclude: &[ChangeId],
    ) -> Result<Materialized, CoreError> {
        let filter = ChangeFilter::from_lists(include, exclude)?;
        self.materializer().materialize(times_seen, &filter).await
    }

    /// Apply qualifying changes to the base map and encode the result.
    pub async fn render(
        &self,
        times_seen: usize,
        format: MapFormat,
        include: &[ChangeId],
        exclude: &[ChangeId],
    ) -> Result<RenderedMap, CoreError> {
        let filter = ChangeFilter::from_lists(include, exclude)?;
        self.materializer()
            .render(times_seen, &filter, format, &self.scratch_dir)
            .await
    }

    /// Version at a reporter threshold.
    pub async fn version(&self, times_seen: usize) -> Result<String, CoreError> {
        self.oracle().version(times_seen).await
    }

    /// Version over every pending change.
    pub async fn raw_version(&self) -> Result<String, CoreError> {
        self.oracle().raw_version().await
    }

    /// Retire changes if `client_version` is current, then refresh the
    /// base map.
    pub async fn commit(
        &self,
        may_commit: bool,
        client_version: &str,
        obsolete_ids: &[ChangeId],
    ) -> Result<CommitOutcome, CoreError> {
        self.commits
            .apply_changes(
                &self.ledger,
                &self.base,
                may_commit,
                client_version,
                obsolete_ids,
            )
            .await
    }

    /// Re-fetch the base map outside of a commit.
    pub async fn refresh(&self) -> Result<BaseSnapshot, CoreError> {
        Ok(self.base.refresh().await?)
    }

    const fn oracle(&self) -> VersionOracle<'_, S> {
        VersionOracle::new(&self.ledger, &self.base)
    }

    const fn materializer(&self) -> Materializer<'_, S> {
        Materializer::new(&self.ledger, &self.base)
    }
}
