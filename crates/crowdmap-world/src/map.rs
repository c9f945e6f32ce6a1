//! The in-memory map: rooms, areas, and area names.
//!
//! [`MapSnapshot`] is plain data. Bounding-box fields on [`Area`] are derived
//! from member room coordinates and are kept current by
//! [`recompute_area_bounds`](crate::bounds::recompute_area_bounds); they are
//! never edited directly by a change.

use std::collections::BTreeMap;

use crowdmap_types::Direction;
use serde::{Deserialize, Serialize};

/// Area that newly created rooms are placed in until they are moved.
pub const DEFAULT_AREA_ID: i32 = -1;

/// A single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    /// Display name.
    pub name: String,
    /// Owning area id.
    pub area: i32,
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate (level).
    pub z: i32,
    /// Standard exits, direction to destination room.
    pub exits: BTreeMap<Direction, i32>,
    /// Special exits, command to destination room.
    pub special_exits: BTreeMap<String, i32>,
    /// Destinations of locked special exits.
    pub special_exit_locks: Vec<i32>,
    /// Pathing weights keyed by direction short name or special exit command.
    pub exit_weights: BTreeMap<String, i32>,
    /// Environment (terrain) id.
    pub environment: i32,
    /// Pathing weight of the room itself.
    pub weight: i32,
    /// Whether the room is locked for pathing.
    pub is_locked: bool,
    /// Map symbol.
    pub symbol: String,
    /// Free-form user data.
    pub user_data: BTreeMap<String, String>,
}

impl Default for Room {
    fn default() -> Self {
        Self {
            name: String::new(),
            area: DEFAULT_AREA_ID,
            x: 0,
            y: 0,
            z: 0,
            exits: BTreeMap::new(),
            special_exits: BTreeMap::new(),
            special_exit_locks: Vec::new(),
            exit_weights: BTreeMap::new(),
            environment: -1,
            weight: 0,
            is_locked: false,
            symbol: String::new(),
            user_data: BTreeMap::new(),
        }
    }
}

/// An area and its cached geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Area {
    /// Member room numbers.
    pub rooms: Vec<i32>,
    /// Z levels that hold (or have held) member rooms, ascending.
    pub z_levels: Vec<i32>,
    /// Smallest member x.
    pub min_x: i32,
    /// Largest member x.
    pub max_x: i32,
    /// Smallest member y.
    pub min_y: i32,
    /// Largest member y.
    pub max_y: i32,
    /// Smallest member z.
    pub min_z: i32,
    /// Largest member z.
    pub max_z: i32,
    /// Largest x per z level.
    pub x_max_for_z: BTreeMap<i32, i32>,
    /// Smallest x per z level.
    pub x_min_for_z: BTreeMap<i32, i32>,
    /// Largest y per z level.
    pub y_max_for_z: BTreeMap<i32, i32>,
    /// Smallest y per z level.
    pub y_min_for_z: BTreeMap<i32, i32>,
    /// Free-form user data.
    pub user_data: BTreeMap<String, String>,
}

/// A full map: every room, every area, and the area name table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapSnapshot {
    /// Rooms keyed by room number.
    pub rooms: BTreeMap<i32, Room>,
    /// Areas keyed by area id.
    pub areas: BTreeMap<i32, Area>,
    /// Area display names keyed by area id.
    pub area_names: BTreeMap<i32, String>,
}

impl MapSnapshot {
    /// Create an empty map.
    pub const fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
            areas: BTreeMap::new(),
            area_names: BTreeMap::new(),
        }
    }

    /// Look up a room.
    pub fn room(&self, number: i32) -> Option<&Room> {
        self.rooms.get(&number)
    }

    /// Look up a room mutably.
    pub fn room_mut(&mut self, number: i32) -> Option<&mut Room> {
        self.rooms.get_mut(&number)
    }

    /// Look up an area.
    pub fn area(&self, id: i32) -> Option<&Area> {
        self.areas.get(&id)
    }

    /// Whether an area with this display name exists.
    pub fn has_area_named(&self, name: &str) -> bool {
        self.area_names.values().any(|existing| existing == name)
    }

    /// Insert `room` as a member of area `area_id`, creating the area entry
    /// if needed. Used to build fixtures and by the codec on import.
    pub fn insert_room(&mut self, number: i32, mut room: Room, area_id: i32) {
        room.area = area_id;
        self.rooms.insert(number, room);
        let area = self.areas.entry(area_id).or_default();
        if !area.rooms.contains(&number) {
            area.rooms.push(number);
        }
    }
}
