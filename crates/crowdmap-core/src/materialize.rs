//! Folding pending changes onto the base map.
//!
//! Changes are applied strictly in ascending change-id order so later
//! changes observe the effects of earlier ones. The cached base snapshot is
//! shared between requests and is never mutated; every materialization
//! works on its own copy.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crowdmap_ledger::{ChangeFilter, Ledger, LedgerStore};
use crowdmap_types::{Change, MapFormat};
use crowdmap_world::{Apply, MapCodec, MapSnapshot};

use crate::base_map::BaseMap;
use crate::error::CoreError;
use crate::version::VersionOracle;

/// Apply `changes` to a copy of `base` in ascending change-id order.
pub fn fold(base: &MapSnapshot, changes: &[Change]) -> MapSnapshot {
    let mut ordered: Vec<&Change> = changes.iter().collect();
    ordered.sort_by_key(|change| change.change_id);

    let mut map = base.clone();
    for change in ordered {
        change.apply(&mut map);
    }
    map
}

/// A materialized map and the version it corresponds to.
#[derive(Debug, Clone)]
pub struct Materialized {
    /// The base map with the selected changes applied.
    pub map: MapSnapshot,
    /// Number of changes applied.
    pub applied: usize,
    /// Version of the change set at the requested threshold.
    pub version: String,
}

/// A materialized map encoded for transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMap {
    /// Encoded map bytes.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: MapFormat,
    /// Version of the change set at the requested threshold.
    pub version: String,
}

/// Produces derived maps from the base map and the ledger.
pub struct Materializer<'a, S> {
    ledger: &'a Ledger<S>,
    base: &'a BaseMap,
}

impl<'a, S: LedgerStore> Materializer<'a, S> {
    /// Create a materializer over a ledger and base map.
    pub const fn new(ledger: &'a Ledger<S>, base: &'a BaseMap) -> Self {
        Self { ledger, base }
    }

    /// Apply every change seen by at least `times_seen` reporters that
    /// passes `filter` to a copy of the current base map.
    pub async fn materialize(
        &self,
        times_seen: usize,
        filter: &ChangeFilter,
    ) -> Result<Materialized, CoreError> {
        let changes = self.ledger.changes(times_seen, filter).await?;
        let base = self.base.current().await;
        let version = VersionOracle::new(self.ledger, self.base)
            .version(times_seen)
            .await?;

        let map = fold(&base.map, &changes);
        tracing::debug!(
            times_seen,
            applied = changes.len(),
            version = %version,
            "Map materialized"
        );
        Ok(Materialized {
            map,
            applied: changes.len(),
            version,
        })
    }

    /// Materialize and encode the result in `format`.
    ///
    /// The codec writes to files, so the map is written to a scratch file
    /// under `scratch_dir`, read back, and the file removed.
    pub async fn render(
        &self,
        times_seen: usize,
        filter: &ChangeFilter,
        format: MapFormat,
        scratch_dir: &Path,
    ) -> Result<RenderedMap, CoreError> {
        let materialized = self.materialize(times_seen, filter).await?;
        let bytes = encode(self.base.codec(), materialized.map, format, scratch_dir).await?;
        Ok(RenderedMap {
            bytes,
            format,
            version: materialized.version,
        })
    }
}

async fn encode(
    codec: Arc<dyn MapCodec>,
    map: MapSnapshot,
    format: MapFormat,
    scratch_dir: &Path,
) -> Result<Vec<u8>, CoreError> {
    let extension = match format {
        MapFormat::Binary => "dat",
        MapFormat::Json => "json",
    };
    let path: PathBuf = scratch_dir.join(format!("crowdmap-render-{}.{extension}", uuid::Uuid::new_v4()));

    let target = path.clone();
    tokio::task::spawn_blocking(move || match format {
        MapFormat::Binary => codec.write(&map, &target),
        MapFormat::Json => codec.export_json(&map, &target),
    })
    .await??;

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| CoreError::RenderIo {
            path: path.clone(),
            source,
        })?;
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!(path = %path.display(), error = %err, "Failed to remove render scratch file");
    }
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crowdmap_types::{ChangeKind, ReporterSet};
    use crowdmap_world::{Room, recompute_area_bounds};

    use super::*;

    fn base() -> MapSnapshot {
        let mut map = MapSnapshot::new();
        map.areas.insert(2, crowdmap_world::Area::default());
        map.insert_room(1, Room::default(), 1);
        map.insert_room(
            2,
            Room {
                x: 5,
                ..Room::default()
            },
            1,
        );
        recompute_area_bounds(&mut map, 1);
        map
    }

    fn change(kind: ChangeKind) -> Change {
        Change::new(kind, ReporterSet::single("r"))
    }

    #[test]
    fn fold_applies_in_id_order_regardless_of_input_order() {
        let move_room = change(ChangeKind::SetRoomArea {
            room_number: 1,
            area_id: 2,
        });
        let set_coords = change(ChangeKind::SetRoomCoordinates {
            room_number: 1,
            x: 20,
            y: 0,
            z: 0,
        });
        assert!(move_room.change_id < set_coords.change_id);

        let base = base();
        let forward = fold(&base, &[move_room.clone(), set_coords.clone()]);
        let backward = fold(&base, &[set_coords, move_room]);
        assert_eq!(forward, backward);

        let area_two = forward.area(2).unwrap();
        assert_eq!((area_two.min_x, area_two.max_x), (20, 20));
        let area_one = forward.area(1).unwrap();
        assert_eq!((area_one.min_x, area_one.max_x), (5, 5));
    }

    #[test]
    fn later_change_wins() {
        let first = change(ChangeKind::RoomName {
            room_number: 2,
            name: "Old".to_owned(),
        });
        let second = change(ChangeKind::RoomName {
            room_number: 2,
            name: "New".to_owned(),
        });
        let map = fold(&base(), &[second, first]);
        assert_eq!(map.room(2).unwrap().name, "New");
    }

    #[test]
    fn fold_leaves_base_untouched() {
        let base = base();
        let before = base.clone();
        let map = fold(
            &base,
            &[change(ChangeKind::RoomName {
                room_number: 1,
                name: "Changed".to_owned(),
            })],
        );
        assert_eq!(base, before);
        assert_ne!(map, before);
    }

    #[test]
    fn missing_targets_leave_other_rooms_alone() {
        let base = base();
        let map = fold(
            &base,
            &[change(ChangeKind::RoomName {
                room_number: 77,
                name: "Ghost".to_owned(),
            })],
        );
        assert_eq!(map, base);
    }
}
