//! Core of the crowd-sourced map service.
//!
//! Ties the change ledger to the base map: derives version strings,
//! materializes vetted maps, and promotes pending changes through
//! optimistic-concurrency commits.
//!
//! # Modules
//!
//! - [`config`] -- Typed configuration loaded from `crowdmap-config.yaml`
//! - [`base_map`] -- Base map source and the cached base snapshot
//! - [`version`] -- The version oracle
//! - [`materialize`] -- Folding changes onto the base map
//! - [`commit`] -- The commit coordinator
//! - [`service`] -- [`CrowdmapService`], the operation surface
//! - [`error`] -- Error types

pub mod base_map;
pub mod commit;
pub mod config;
pub mod error;
pub mod materialize;
pub mod service;
pub mod version;

pub use base_map::{BaseMap, BaseMapSource, BaseSnapshot, HttpSource, LocalSource};
pub use commit::{CommitCoordinator, CommitOutcome};
pub use config::{ConfigError, CrowdmapConfig};
pub use error::{BaseMapError, CoreError};
pub use materialize::{Materialized, Materializer, RenderedMap, fold};
pub use service::{ChangeListing, CrowdmapService};
pub use version::{EMPTY_CHANGE_TAG, VersionOracle, change_tag, format_version};
