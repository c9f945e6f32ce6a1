//! Area bounding-box maintenance.
//!
//! An area caches the extremes of its member rooms' coordinates, overall and
//! per z level, plus the list of z levels in use. These must be recomputed
//! whenever a member moves or the membership changes.

use std::collections::BTreeMap;

use crate::map::MapSnapshot;

/// Recompute the cached geometry of area `area_id` from its member rooms.
///
/// Only members that exist in `map.rooms` contribute. An area without any
/// resolvable members keeps its previous bounds. Z levels are only ever
/// added, never dropped, and stay sorted ascending. The per-level extrema
/// follow the same rule: occupied levels are recomputed, vacated levels keep
/// their last values, so every entry of `z_levels` has a per-level entry.
///
/// Missing areas are ignored.
pub fn recompute_area_bounds(map: &mut MapSnapshot, area_id: i32) {
    let Some(area) = map.areas.get_mut(&area_id) else {
        return;
    };
    let rooms = &map.rooms;

    let coords: Vec<(i32, i32, i32)> = area
        .rooms
        .iter()
        .filter_map(|number| rooms.get(number))
        .map(|room| (room.x, room.y, room.z))
        .collect();

    let Some(&(x0, y0, z0)) = coords.first() else {
        return;
    };

    let (mut min_x, mut max_x) = (x0, x0);
    let (mut min_y, mut max_y) = (y0, y0);
    let (mut min_z, mut max_z) = (z0, z0);
    let mut x_max_for_z: BTreeMap<i32, i32> = BTreeMap::new();
    let mut x_min_for_z: BTreeMap<i32, i32> = BTreeMap::new();
    let mut y_max_for_z: BTreeMap<i32, i32> = BTreeMap::new();
    let mut y_min_for_z: BTreeMap<i32, i32> = BTreeMap::new();

    for &(x, y, z) in &coords {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
        min_z = min_z.min(z);
        max_z = max_z.max(z);

        x_max_for_z
            .entry(z)
            .and_modify(|v| *v = (*v).max(x))
            .or_insert(x);
        x_min_for_z
            .entry(z)
            .and_modify(|v| *v = (*v).min(x))
            .or_insert(x);
        y_max_for_z
            .entry(z)
            .and_modify(|v| *v = (*v).max(y))
            .or_insert(y);
        y_min_for_z
            .entry(z)
            .and_modify(|v| *v = (*v).min(y))
            .or_insert(y);

        if !area.z_levels.contains(&z) {
            area.z_levels.push(z);
        }
    }
    area.z_levels.sort_unstable();

    area.min_x = min_x;
    area.max_x = max_x;
    area.min_y = min_y;
    area.max_y = max_y;
    area.min_z = min_z;
    area.max_z = max_z;
    area.x_max_for_z.extend(x_max_for_z);
    area.x_min_for_z.extend(x_min_for_z);
    area.y_max_for_z.extend(y_max_for_z);
    area.y_min_for_z.extend(y_min_for_z);

    tracing::trace!(
        area_id,
        members = coords.len(),
        min_x,
        max_x,
        min_y,
        max_y,
        min_z,
        max_z,
        "area bounds recomputed"
    );
}
