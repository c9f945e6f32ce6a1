//! Error types for the `crowdmap-world` crate.
//!
//! Only codec operations can fail. Applying changes is infallible.

use std::path::PathBuf;

/// Errors that can occur while reading or writing a map.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A map file could not be read or written.
    #[error("map file I/O failed for {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A map could not be encoded or decoded.
    #[error("map encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}
