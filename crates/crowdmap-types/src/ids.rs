//! Type-safe identifier wrapper for ledger records.
//!
//! Change ids are UUID v7 (time-ordered) and generated application-side the
//! first time a change is persisted. Byte order of a v7 UUID follows its
//! creation time, so sorting by [`ChangeId`] sorts by first submission, both
//! in memory and in `PostgreSQL`.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique, stable identifier of a change record in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(pub Uuid);

impl ChangeId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Return the raw 16 bytes of the identifier.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for ChangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ChangeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ChangeId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<ChangeId> for Uuid {
    fn from(id: ChangeId) -> Self {
        id.0
    }
}

/// Error returned when a string is not a valid change id.
#[derive(Debug, thiserror::Error)]
#[error("invalid change id {input:?}: {source}")]
pub struct ParseChangeIdError {
    /// The rejected input.
    pub input: String,
    /// The underlying UUID parse error.
    pub source: uuid::Error,
}

impl FromStr for ChangeId {
    type Err = ParseChangeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|source| ParseChangeIdError {
                input: s.to_owned(),
                source,
            })
    }
}
