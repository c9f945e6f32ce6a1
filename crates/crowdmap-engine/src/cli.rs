//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use crowdmap_core::config::StorageBackend;
use crowdmap_types::{ChangeId, MapFormat};

use crate::error::EngineError;

/// Operator tool for the crowd-sourced map service.
#[derive(Debug, Parser)]
#[command(name = "crowdmap-engine")]
#[command(about = "Submit, review, materialize, and commit crowd-sourced map changes")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "crowdmap-config.yaml")]
    pub config: PathBuf,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed on the command line.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a change submission.
    Submit {
        /// Change payload as JSON, e.g. `{"type":"room-name","roomNumber":1,"name":"Hall"}`.
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        change: Option<String>,
        /// Read the payload from this file instead.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Reporter token.
        #[arg(long)]
        reporter: String,
    },
    /// List pending changes.
    Changes {
        /// Minimum number of reporters.
        #[arg(long)]
        times_seen: Option<usize>,
        /// Id filters.
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the version string.
    Version {
        /// Minimum number of reporters. Ignored with `--raw`.
        #[arg(long)]
        times_seen: Option<usize>,
        /// Print the raw version used for commits.
        #[arg(long)]
        raw: bool,
    },
    /// Apply pending changes to the base map and write the result.
    Materialize {
        /// Minimum number of reporters.
        #[arg(long)]
        times_seen: Option<usize>,
        /// Output encoding.
        #[arg(long, value_enum, default_value_t = FormatArg::Binary)]
        format: FormatArg,
        /// Output file.
        #[arg(long)]
        out: PathBuf,
        /// Id filters.
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Retire changes that a new base map already contains.
    Commit {
        /// Raw version the caller reviewed.
        #[arg(long = "client-version")]
        client_version: String,
        /// Changes to retire.
        #[arg(long, value_delimiter = ',')]
        ids: Vec<ChangeId>,
    },
    /// Re-fetch the base map and version marker.
    Refresh,
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::Changes { .. } => "changes",
            Self::Version { .. } => "version",
            Self::Materialize { .. } => "materialize",
            Self::Commit { .. } => "commit",
            Self::Refresh => "refresh",
        }
    }

    /// Whether the command changes what the ledger holds.
    pub const fn writes_ledger(&self) -> bool {
        matches!(self, Self::Submit { .. } | Self::Commit { .. })
    }

    /// Refuse ledger writes that would be lost when this process exits.
    ///
    /// # Errors
    ///
    /// [`EngineError::EphemeralLedger`] for `submit` or `commit` against the
    /// memory backend.
    pub const fn check_backend(&self, backend: StorageBackend) -> Result<(), EngineError> {
        if matches!(backend, StorageBackend::Memory) && self.writes_ledger() {
            return Err(EngineError::EphemeralLedger {
                command: self.name(),
            });
        }
        Ok(())
    }
}

/// Mutually exclusive id filters.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only these change ids.
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<ChangeId>,
    /// All changes except these ids.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<ChangeId>,
}

/// Output encoding selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// The map codec's native encoding.
    Binary,
    /// Indented JSON.
    Json,
}

impl From<FormatArg> for MapFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Binary => Self::Binary,
            FormatArg::Json => Self::Json,
        }
    }
}
