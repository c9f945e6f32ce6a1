//! Map state and change application for the crowd-sourced map service.
//!
//! This crate models the map that changes are folded into: rooms keyed by
//! number, areas keyed by id, and the derived bounding boxes each area
//! caches over its member rooms.
//!
//! # Modules
//!
//! - [`map`] -- [`MapSnapshot`], [`Room`], and [`Area`]
//! - [`bounds`] -- Area bounding-box maintenance after coordinate or
//!   membership changes
//! - [`apply`] -- The [`Apply`] trait: folding a change into a snapshot
//! - [`codec`] -- The [`MapCodec`] seam and the JSON implementation
//! - [`error`] -- Error types for codec operations
//!
//! Applying a change never fails. A change whose target room or area is
//! missing from the snapshot is a silent no-op, because the change log may
//! run ahead of or behind the base map.

pub mod apply;
pub mod bounds;
pub mod codec;
pub mod error;
pub mod map;

// Re-export primary types at crate root.
pub use apply::Apply;
pub use bounds::recompute_area_bounds;
pub use codec::{JsonMapCodec, MapCodec};
pub use error::WorldError;
pub use map::{Area, DEFAULT_AREA_ID, MapSnapshot, Room};
