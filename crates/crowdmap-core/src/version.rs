//! Version strings.
//!
//! A version is `{marker}.{tag}.{count}`: the base map's version marker, a
//! short tag derived from the last qualifying change id, and the number of
//! qualifying changes. Identical ledger contents and threshold always give
//! the same string; adding or retiring a qualifying change changes it.

use crowdmap_ledger::{Ledger, LedgerStore, LedgerSummary};
use crowdmap_types::ChangeId;
use sha2::{Digest, Sha256};

use crate::base_map::BaseMap;
use crate::error::CoreError;

/// Tag used when no change qualifies.
pub const EMPTY_CHANGE_TAG: &str = "0000000000000000";

/// Number of digest bytes kept in a change tag.
const TAG_BYTES: usize = 8;

/// Short, stable tag for a change id.
///
/// The first eight bytes of the SHA-256 of the id, in lowercase hex.
pub fn change_tag(id: Option<ChangeId>) -> String {
    id.map_or_else(
        || EMPTY_CHANGE_TAG.to_owned(),
        |id| {
            let digest = Sha256::digest(id.as_bytes());
            hex::encode(digest.get(..TAG_BYTES).unwrap_or_default())
        },
    )
}

/// Assemble a version string.
pub fn format_version(marker: &str, summary: &LedgerSummary) -> String {
    format!("{marker}.{}.{}", change_tag(summary.last), summary.count)
}

/// Derives version strings from the ledger and the base map.
pub struct VersionOracle<'a, S> {
    ledger: &'a Ledger<S>,
    base: &'a BaseMap,
}

impl<'a, S: LedgerStore> VersionOracle<'a, S> {
    /// Create an oracle over a ledger and base map.
    pub const fn new(ledger: &'a Ledger<S>, base: &'a BaseMap) -> Self {
        Self { ledger, base }
    }

    /// Version of the change set seen by at least `times_seen` reporters.
    pub async fn version(&self, times_seen: usize) -> Result<String, CoreError> {
        let summary = self.ledger.summary(times_seen).await?;
        let marker = self.base.marker().await;
        Ok(format_version(&marker, &summary))
    }

    /// Version over every pending change regardless of trust. This is the
    /// value commits are checked against.
    pub async fn raw_version(&self) -> Result<String, CoreError> {
        self.version(0).await
    }
}
