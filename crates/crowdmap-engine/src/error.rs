//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and command
//! execution so `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crowdmap_core::ConfigError,
    },

    /// The base map could not be loaded.
    #[error("base map error: {source}")]
    BaseMap {
        /// The underlying base map error.
        #[from]
        source: crowdmap_core::BaseMapError,
    },

    /// A service operation failed.
    #[error("{source}")]
    Core {
        /// The underlying service error.
        #[from]
        source: crowdmap_core::CoreError,
    },

    /// The database could not be reached or migrated.
    #[error("database error: {source}")]
    Db {
        /// The underlying database error.
        #[from]
        source: crowdmap_db::DbError,
    },

    /// Command input could not be parsed.
    #[error("invalid input: {source}")]
    Input {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A ledger write was requested against the in-process backend, which
    /// is discarded when the command exits.
    #[error("`{command}` needs a persistent ledger; set storage.backend to postgres")]
    EphemeralLedger {
        /// The refused subcommand.
        command: &'static str,
    },

    /// `submit` was given neither `--change` nor `--file`.
    #[error("no change payload given")]
    MissingPayload,

    /// A file named on the command line could not be read or written.
    #[error("file error for {path}: {source}")]
    File {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
