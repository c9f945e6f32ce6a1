//! Folding changes into a map snapshot.
//!
//! Every operation here is idempotent: applying the same change twice leaves
//! the map as applying it once does. A change that targets a room or area
//! absent from the snapshot does nothing.

use crowdmap_types::{Change, ChangeKind};

use crate::bounds::recompute_area_bounds;
use crate::map::{DEFAULT_AREA_ID, MapSnapshot, Room};

/// Something that can be applied to a [`MapSnapshot`].
pub trait Apply {
    /// Mutate `map` to reflect this change.
    fn apply(&self, map: &mut MapSnapshot);
}

impl Apply for Change {
    fn apply(&self, map: &mut MapSnapshot) {
        self.kind.apply(map);
    }
}

impl Apply for ChangeKind {
    #[allow(clippy::too_many_lines)]
    fn apply(&self, map: &mut MapSnapshot) {
        match self {
            Self::RoomName { room_number, name } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.name.clone_from(name);
                }
            }

            Self::ModifyExit {
                room_number,
                direction,
                destination,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.exits.insert(*direction, *destination);
                }
            }

            Self::DeleteExit {
                room_number,
                direction,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.exits.remove(direction);
                    room.exit_weights.remove(direction.short());
                }
            }

            Self::ModifyExitWeight {
                room_number,
                direction,
                weight,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.exit_weights
                        .insert(direction.short().to_owned(), *weight);
                }
            }

            Self::ModifySpecialExit {
                room_number,
                exit_command,
                destination,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.special_exits
                        .insert(exit_command.clone(), *destination);
                }
            }

            Self::ModifySpecialExitWeight {
                room_number,
                exit_command,
                weight,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.exit_weights.insert(exit_command.clone(), *weight);
                }
            }

            Self::LockSpecialExit {
                room_number,
                destination,
                ..
            } => {
                if let Some(room) = map.room_mut(*room_number)
                    && !room.special_exit_locks.contains(destination)
                {
                    room.special_exit_locks.push(*destination);
                }
            }

            Self::UnlockSpecialExit {
                room_number,
                destination,
                ..
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.special_exit_locks.retain(|locked| locked != destination);
                }
            }

            Self::DeleteSpecialExit {
                room_number,
                exit_command,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    if let Some(destination) = room.special_exits.remove(exit_command) {
                        room.special_exit_locks.retain(|locked| *locked != destination);
                    }
                    room.exit_weights.remove(exit_command);
                }
            }

            Self::CreateRoom { room_number } => {
                if map.rooms.contains_key(room_number) {
                    return;
                }
                map.insert_room(*room_number, Room::default(), DEFAULT_AREA_ID);
                recompute_area_bounds(map, DEFAULT_AREA_ID);
            }

            Self::SetRoomCoordinates {
                room_number,
                x,
                y,
                z,
            } => {
                let Some(room) = map.room_mut(*room_number) else {
                    return;
                };
                room.x = *x;
                room.y = *y;
                room.z = *z;
                let area_id = room.area;
                recompute_area_bounds(map, area_id);
            }

            Self::CreateArea { name, area_id } => {
                if map.area_names.contains_key(area_id)
                    || map.areas.contains_key(area_id)
                    || map.has_area_named(name)
                {
                    return;
                }
                map.area_names.insert(*area_id, name.clone());
                map.areas.insert(*area_id, crate::map::Area::default());
            }

            Self::SetRoomArea {
                room_number,
                area_id,
            } => set_room_area(map, *room_number, *area_id),

            Self::SetRoomEnvironment {
                room_number,
                environment_id,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.environment = *environment_id;
                }
            }

            Self::ModifyRoomUserData {
                room_number,
                key,
                value,
            } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.user_data.insert(key.clone(), value.clone());
                }
            }

            Self::DeleteRoomUserData { room_number, key } => {
                if let Some(room) = map.room_mut(*room_number) {
                    room.user_data.remove(key);
                }
            }
        }
    }
}

/// Move a room between areas and refresh both areas' bounds.
fn set_room_area(map: &mut MapSnapshot, room_number: i32, area_id: i32) {
    let Some(previous) = map.room(room_number).map(|room| room.area) else {
        return;
    };
    if previous == area_id || !map.areas.contains_key(&area_id) {
        return;
    }

    if let Some(old_area) = map.areas.get_mut(&previous) {
        old_area.rooms.retain(|member| *member != room_number);
    }
    if let Some(new_area) = map.areas.get_mut(&area_id)
        && !new_area.rooms.contains(&room_number)
    {
        new_area.rooms.push(room_number);
    }
    if let Some(room) = map.room_mut(room_number) {
        room.area = area_id;
    }

    recompute_area_bounds(map, previous);
    recompute_area_bounds(map, area_id);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crowdmap_types::{Direction, ReporterSet};

    use super::*;
    use crate::map::Area;

    fn fixture() -> MapSnapshot {
        let mut map = MapSnapshot::new();
        map.area_names.insert(1, "Town".to_owned());
        map.area_names.insert(2, "Forest".to_owned());
        map.areas.insert(2, Area::default());
        map.insert_room(
            10,
            Room {
                name: "Square".to_owned(),
                ..Room::default()
            },
            1,
        );
        map.insert_room(
            11,
            Room {
                x: 1,
                ..Room::default()
            },
            1,
        );
        recompute_area_bounds(&mut map, 1);
        map
    }

    fn apply_twice(kind: &ChangeKind, map: &mut MapSnapshot) -> MapSnapshot {
        kind.apply(map);
        let once = map.clone();
        kind.apply(map);
        once
    }

    #[test]
    fn room_name_is_idempotent() {
        let mut map = fixture();
        let change = ChangeKind::RoomName {
            room_number: 10,
            name: "Plaza".to_owned(),
        };
        let once = apply_twice(&change, &mut map);
        assert_eq!(once, map);
        assert_eq!(map.room(10).unwrap().name, "Plaza");
    }

    #[test]
    fn exits_and_weights() {
        let mut map = fixture();
        ChangeKind::ModifyExit {
            room_number: 10,
            direction: Direction::North,
            destination: 11,
        }
        .apply(&mut map);
        ChangeKind::ModifyExitWeight {
            room_number: 10,
            direction: Direction::North,
            weight: 5,
        }
        .apply(&mut map);

        let room = map.room(10).unwrap();
        assert_eq!(room.exits.get(&Direction::North), Some(&11));
        assert_eq!(room.exit_weights.get("n"), Some(&5));

        ChangeKind::DeleteExit {
            room_number: 10,
            direction: Direction::North,
        }
        .apply(&mut map);
        let room = map.room(10).unwrap();
        assert!(room.exits.is_empty());
        assert!(room.exit_weights.is_empty());
    }

    #[test]
    fn special_exit_lifecycle() {
        let mut map = fixture();
        let command = "climb rope".to_owned();
        ChangeKind::ModifySpecialExit {
            room_number: 10,
            exit_command: command.clone(),
            destination: 11,
        }
        .apply(&mut map);
        ChangeKind::ModifySpecialExitWeight {
            room_number: 10,
            exit_command: command.clone(),
            weight: 3,
        }
        .apply(&mut map);
        let lock = ChangeKind::LockSpecialExit {
            room_number: 10,
            exit_command: command.clone(),
            destination: 11,
        };
        apply_twice(&lock, &mut map);

        let room = map.room(10).unwrap();
        assert_eq!(room.special_exits.get(&command), Some(&11));
        assert_eq!(room.exit_weights.get(&command), Some(&3));
        assert_eq!(room.special_exit_locks, vec![11]);

        ChangeKind::UnlockSpecialExit {
            room_number: 10,
            exit_command: command.clone(),
            destination: 11,
        }
        .apply(&mut map);
        assert!(map.room(10).unwrap().special_exit_locks.is_empty());

        lock.apply(&mut map);
        ChangeKind::DeleteSpecialExit {
            room_number: 10,
            exit_command: command,
        }
        .apply(&mut map);
        let room = map.room(10).unwrap();
        assert!(room.special_exits.is_empty());
        assert!(room.special_exit_locks.is_empty());
        assert!(room.exit_weights.is_empty());
    }

    #[test]
    fn create_room_places_room_in_default_area() {
        let mut map = fixture();
        let change = ChangeKind::CreateRoom { room_number: 50 };
        let once = apply_twice(&change, &mut map);
        assert_eq!(once, map);

        let room = map.room(50).unwrap();
        assert_eq!(room.area, DEFAULT_AREA_ID);
        assert_eq!(map.area(DEFAULT_AREA_ID).unwrap().rooms, vec![50]);
    }

    #[test]
    fn create_room_leaves_existing_room_alone() {
        let mut map = fixture();
        ChangeKind::CreateRoom { room_number: 10 }.apply(&mut map);
        assert_eq!(map.room(10).unwrap().name, "Square");
        assert_eq!(map.room(10).unwrap().area, 1);
    }

    #[test]
    fn coordinates_update_area_bounds() {
        let mut map = fixture();
        ChangeKind::SetRoomCoordinates {
            room_number: 11,
            x: 9,
            y: -4,
            z: 2,
        }
        .apply(&mut map);

        let area = map.area(1).unwrap();
        assert_eq!((area.min_x, area.max_x), (0, 9));
        assert_eq!((area.min_y, area.max_y), (-4, 0));
        assert_eq!(area.z_levels, vec![0, 2]);
    }

    #[test]
    fn create_area_skips_duplicates() {
        let mut map = fixture();
        ChangeKind::CreateArea {
            name: "Caves".to_owned(),
            area_id: 3,
        }
        .apply(&mut map);
        assert_eq!(map.area_names.get(&3).map(String::as_str), Some("Caves"));
        assert!(map.areas.contains_key(&3));

        ChangeKind::CreateArea {
            name: "Caves".to_owned(),
            area_id: 4,
        }
        .apply(&mut map);
        ChangeKind::CreateArea {
            name: "Other".to_owned(),
            area_id: 2,
        }
        .apply(&mut map);
        assert!(!map.areas.contains_key(&4));
        assert_eq!(map.area_names.get(&2).map(String::as_str), Some("Forest"));
    }

    #[test]
    fn set_room_area_moves_membership() {
        let mut map = fixture();
        ChangeKind::SetRoomCoordinates {
            room_number: 11,
            x: 6,
            y: 6,
            z: 1,
        }
        .apply(&mut map);
        let change = ChangeKind::SetRoomArea {
            room_number: 11,
            area_id: 2,
        };
        let once = apply_twice(&change, &mut map);
        assert_eq!(once, map);

        assert_eq!(map.room(11).unwrap().area, 2);
        assert_eq!(map.area(1).unwrap().rooms, vec![10]);
        assert_eq!(map.area(2).unwrap().rooms, vec![11]);
        let forest = map.area(2).unwrap();
        assert_eq!((forest.min_x, forest.max_x, forest.max_z), (6, 6, 1));
        let town = map.area(1).unwrap();
        assert_eq!((town.min_x, town.max_x), (0, 0));
    }

    #[test]
    fn set_room_area_to_unknown_area_is_noop() {
        let mut map = fixture();
        let before = map.clone();
        ChangeKind::SetRoomArea {
            room_number: 11,
            area_id: 99,
        }
        .apply(&mut map);
        assert_eq!(before, map);
    }

    #[test]
    fn environment_and_user_data() {
        let mut map = fixture();
        ChangeKind::SetRoomEnvironment {
            room_number: 10,
            environment_id: 7,
        }
        .apply(&mut map);
        ChangeKind::ModifyRoomUserData {
            room_number: 10,
            key: "note".to_owned(),
            value: "fountain".to_owned(),
        }
        .apply(&mut map);

        let room = map.room(10).unwrap();
        assert_eq!(room.environment, 7);
        assert_eq!(room.user_data.get("note").map(String::as_str), Some("fountain"));

        ChangeKind::DeleteRoomUserData {
            room_number: 10,
            key: "note".to_owned(),
        }
        .apply(&mut map);
        assert!(map.room(10).unwrap().user_data.is_empty());
    }

    #[test]
    fn changes_for_missing_rooms_do_nothing() {
        let mut map = fixture();
        let before = map.clone();
        let changes = [
            ChangeKind::RoomName {
                room_number: 404,
                name: "Nowhere".to_owned(),
            },
            ChangeKind::ModifyExit {
                room_number: 404,
                direction: Direction::Up,
                destination: 10,
            },
            ChangeKind::SetRoomCoordinates {
                room_number: 404,
                x: 1,
                y: 1,
                z: 1,
            },
            ChangeKind::SetRoomArea {
                room_number: 404,
                area_id: 2,
            },
            ChangeKind::DeleteRoomUserData {
                room_number: 404,
                key: "k".to_owned(),
            },
        ];
        for change in &changes {
            change.apply(&mut map);
        }
        assert_eq!(before, map);
    }

    #[test]
    fn change_record_applies_its_payload() {
        let mut map = fixture();
        let change = Change::new(
            ChangeKind::RoomName {
                room_number: 11,
                name: "Alley".to_owned(),
            },
            ReporterSet::single("alice"),
        );
        change.apply(&mut map);
        assert_eq!(map.room(11).unwrap().name, "Alley");
    }
}
