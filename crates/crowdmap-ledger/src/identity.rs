//! Stable identity keys.
//!
//! Stores that cannot index a [`ChangeKind`] directly (a database column,
//! for instance) match on this key instead. It is the lowercase hex SHA-256
//! of the payload's JSON encoding. Field order in that encoding is fixed by
//! the type definition, so equal payloads always produce equal keys.

use crowdmap_types::ChangeKind;
use sha2::{Digest, Sha256};

use crate::error::LedgerError;

/// Compute the identity key of a payload.
pub fn identity_key(kind: &ChangeKind) -> Result<String, LedgerError> {
    let canonical = serde_json::to_vec(kind)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}
