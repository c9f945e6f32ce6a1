//! Shared type definitions for the crowd-sourced map service.
//!
//! This crate is the single source of truth for the change records that
//! contributors submit and the ledger stores. It carries no map state and
//! no persistence logic; those live in `crowdmap-world` and
//! `crowdmap-ledger` respectively.
//!
//! # Modules
//!
//! - [`ids`] -- The time-ordered [`ChangeId`] wrapper
//! - [`enums`] -- Exit directions, change type tags, and output formats
//! - [`reporters`] -- [`ReporterSet`], the grow-only set of reporter tokens
//! - [`change`] -- [`ChangeKind`] payloads and the stored [`Change`] record
//! - [`submission`] -- Inbound [`ChangeSubmission`] and its validation

pub mod change;
pub mod enums;
pub mod ids;
pub mod reporters;
pub mod submission;

// Re-export all public types at crate root for convenience.
pub use change::{Change, ChangeKind, ChangeView};
pub use enums::{ChangeType, Direction, MapFormat};
pub use ids::{ChangeId, ParseChangeIdError};
pub use reporters::ReporterSet;
pub use submission::{ChangeSubmission, SubmissionError};
