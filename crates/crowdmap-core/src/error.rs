//! Error types for the service core.

use std::path::PathBuf;

use crowdmap_ledger::LedgerError;
use crowdmap_world::WorldError;

/// Errors raised while obtaining or reloading the base map.
#[derive(Debug, thiserror::Error)]
pub enum BaseMapError {
    /// An HTTP download failed or returned a non-success status.
    #[error("download of {url} failed: {source}")]
    Download {
        /// The URL being fetched.
        url: String,
        /// The underlying HTTP error.
        source: reqwest::Error,
    },

    /// A base map file could not be read or written.
    #[error("base map file I/O failed for {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A local base map file is required but absent.
    #[error("base map file missing: {0}")]
    Missing(PathBuf),

    /// The map file could not be decoded.
    #[error("base map decode failed: {0}")]
    Codec(#[from] WorldError),

    /// A blocking codec task panicked or was cancelled.
    #[error("base map task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors returned by core service operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The ledger rejected the request or its backend failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The base map could not be loaded or refreshed.
    #[error(transparent)]
    BaseMap(#[from] BaseMapError),

    /// A rendered map could not be produced.
    #[error("render failed: {0}")]
    Render(#[from] WorldError),

    /// A rendered map file could not be read back.
    #[error("render file I/O failed for {path}: {source}")]
    RenderIo {
        /// The scratch file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The caller is not allowed to commit.
    #[error("caller may not commit changes")]
    Forbidden,

    /// The caller's version does not match the server's raw version.
    #[error("version conflict: client has {client}, server is at {server}")]
    Conflict {
        /// The version the caller supplied.
        client: String,
        /// The server's current raw version.
        server: String,
    },
}

impl CoreError {
    /// Whether the caller's input was at fault.
    pub const fn is_validation(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_validation(),
            _ => false,
        }
    }

    /// Whether this is a commit version conflict.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
