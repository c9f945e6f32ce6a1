//! Change payloads and the stored change record.
//!
//! A [`ChangeKind`] is one proposed edit to the map. It is also the change's
//! *identity*: two submissions whose payloads are equal describe the same
//! edit and are merged into one ledger record. Reporters and the change id
//! live on the [`Change`] record, outside the payload, so they can never
//! leak into identity matching.
//!
//! The wire format is an internally tagged object, e.g.
//!
//! ```json
//! { "type": "set-room-coordinates", "roomNumber": 1, "x": 1, "y": 2, "z": 3 }
//! ```

use serde::{Deserialize, Serialize};

use crate::enums::{ChangeType, Direction};
use crate::ids::ChangeId;
use crate::reporters::ReporterSet;

/// The payload of a proposed map edit.
///
/// Every field of a variant takes part in identity. The set is closed;
/// adding a variant forces every exhaustive `match` in the workspace to be
/// revisited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ChangeKind {
    /// Rename a room.
    RoomName {
        /// Target room.
        room_number: i32,
        /// The new room name.
        name: String,
    },
    /// Point a standard exit at a destination room.
    ModifyExit {
        /// Target room.
        room_number: i32,
        /// Exit direction.
        direction: Direction,
        /// Destination room number.
        destination: i32,
    },
    /// Remove a standard exit.
    DeleteExit {
        /// Target room.
        room_number: i32,
        /// Exit direction.
        direction: Direction,
    },
    /// Set the pathing weight of a standard exit.
    ModifyExitWeight {
        /// Target room.
        room_number: i32,
        /// Exit direction.
        direction: Direction,
        /// New weight.
        weight: i32,
    },
    /// Point a special (command-triggered) exit at a destination room.
    ModifySpecialExit {
        /// Target room.
        room_number: i32,
        /// Command that triggers the exit.
        exit_command: String,
        /// Destination room number.
        destination: i32,
    },
    /// Set the pathing weight of a special exit.
    ModifySpecialExitWeight {
        /// Target room.
        room_number: i32,
        /// Command that triggers the exit.
        exit_command: String,
        /// New weight.
        weight: i32,
    },
    /// Lock a special exit.
    LockSpecialExit {
        /// Target room.
        room_number: i32,
        /// Command that triggers the exit.
        exit_command: String,
        /// Destination room of the locked exit.
        destination: i32,
    },
    /// Unlock a special exit.
    UnlockSpecialExit {
        /// Target room.
        room_number: i32,
        /// Command that triggers the exit.
        exit_command: String,
        /// Destination room of the unlocked exit.
        destination: i32,
    },
    /// Remove a special exit.
    DeleteSpecialExit {
        /// Target room.
        room_number: i32,
        /// Command that triggers the exit.
        exit_command: String,
    },
    /// Create a blank room in the default area.
    CreateRoom {
        /// Number of the new room.
        room_number: i32,
    },
    /// Move a room to new coordinates.
    SetRoomCoordinates {
        /// Target room.
        room_number: i32,
        /// New x coordinate.
        x: i32,
        /// New y coordinate.
        y: i32,
        /// New z coordinate.
        z: i32,
    },
    /// Create an empty area.
    CreateArea {
        /// Display name of the area.
        name: String,
        /// Identifier of the area.
        area_id: i32,
    },
    /// Move a room into another area.
    SetRoomArea {
        /// Target room.
        room_number: i32,
        /// Destination area.
        area_id: i32,
    },
    /// Set the environment (terrain) id of a room.
    SetRoomEnvironment {
        /// Target room.
        room_number: i32,
        /// New environment id.
        environment_id: i32,
    },
    /// Set a user-data entry on a room.
    ModifyRoomUserData {
        /// Target room.
        room_number: i32,
        /// User-data key.
        key: String,
        /// User-data value.
        value: String,
    },
    /// Remove a user-data entry from a room.
    DeleteRoomUserData {
        /// Target room.
        room_number: i32,
        /// User-data key.
        key: String,
    },
}

impl ChangeKind {
    /// The wire discriminator of this payload.
    pub const fn change_type(&self) -> ChangeType {
        match self {
            Self::RoomName { .. } => ChangeType::RoomName,
            Self::ModifyExit { .. } => ChangeType::ModifyExit,
            Self::DeleteExit { .. } => ChangeType::DeleteExit,
            Self::ModifyExitWeight { .. } => ChangeType::ModifyExitWeight,
            Self::ModifySpecialExit { .. } => ChangeType::ModifySpecialExit,
            Self::ModifySpecialExitWeight { .. } => ChangeType::ModifySpecialExitWeight,
            Self::LockSpecialExit { .. } => ChangeType::LockSpecialExit,
            Self::UnlockSpecialExit { .. } => ChangeType::UnlockSpecialExit,
            Self::DeleteSpecialExit { .. } => ChangeType::DeleteSpecialExit,
            Self::CreateRoom { .. } => ChangeType::CreateRoom,
            Self::SetRoomCoordinates { .. } => ChangeType::SetRoomCoordinates,
            Self::CreateArea { .. } => ChangeType::CreateArea,
            Self::SetRoomArea { .. } => ChangeType::SetRoomArea,
            Self::SetRoomEnvironment { .. } => ChangeType::SetRoomEnvironment,
            Self::ModifyRoomUserData { .. } => ChangeType::ModifyRoomUserData,
            Self::DeleteRoomUserData { .. } => ChangeType::DeleteRoomUserData,
        }
    }

    /// The room this change targets, or `None` for area-level changes.
    pub const fn room_number(&self) -> Option<i32> {
        match self {
            Self::RoomName { room_number, .. }
            | Self::ModifyExit { room_number, .. }
            | Self::DeleteExit { room_number, .. }
            | Self::ModifyExitWeight { room_number, .. }
            | Self::ModifySpecialExit { room_number, .. }
            | Self::ModifySpecialExitWeight { room_number, .. }
            | Self::LockSpecialExit { room_number, .. }
            | Self::UnlockSpecialExit { room_number, .. }
            | Self::DeleteSpecialExit { room_number, .. }
            | Self::CreateRoom { room_number }
            | Self::SetRoomCoordinates { room_number, .. }
            | Self::SetRoomArea { room_number, .. }
            | Self::SetRoomEnvironment { room_number, .. }
            | Self::ModifyRoomUserData { room_number, .. }
            | Self::DeleteRoomUserData { room_number, .. } => Some(*room_number),
            Self::CreateArea { .. } => None,
        }
    }
}

/// A change record as held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    /// Identifier assigned at first persistence.
    pub change_id: ChangeId,
    /// The edit itself; doubles as the record's identity.
    pub kind: ChangeKind,
    /// Everyone who has reported this edit.
    pub reporters: ReporterSet,
}

impl Change {
    /// Create a record for a change that has never been stored before.
    pub fn new(kind: ChangeKind, reporters: ReporterSet) -> Self {
        Self {
            change_id: ChangeId::new(),
            kind,
            reporters,
        }
    }

    /// The identity used for merge matching.
    pub const fn identity(&self) -> &ChangeKind {
        &self.kind
    }

    /// How many distinct reporters have seen this change.
    pub fn times_seen(&self) -> usize {
        self.reporters.len()
    }

    /// Outbound projection that reports the reporter count, not the tokens.
    pub fn view(&self) -> ChangeView {
        ChangeView {
            kind: self.kind.clone(),
            reporters: self.reporters.len(),
            change_id: self.change_id,
        }
    }
}

/// Public listing form of a change: payload fields, reporter count, and id.
///
/// Reporter tokens are never exposed, only how many there are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeView {
    /// The flattened payload, including its `type` tag.
    #[serde(flatten)]
    pub kind: ChangeKind,
    /// Number of distinct reporters.
    pub reporters: usize,
    /// The record identifier.
    pub change_id: ChangeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinates() -> ChangeKind {
        ChangeKind::SetRoomCoordinates {
            room_number: 1,
            x: 1,
            y: 2,
            z: 3,
        }
    }

    #[test]
    fn payload_uses_kebab_tag_and_camel_fields() {
        let json = serde_json::to_value(coordinates()).unwrap_or_default();
        assert_eq!(json["type"], "set-room-coordinates");
        assert_eq!(json["roomNumber"], 1);
        assert_eq!(json["z"], 3);
    }

    #[test]
    fn identity_ignores_reporters_and_id() {
        let a = Change::new(coordinates(), ReporterSet::single("alice"));
        let b = Change::new(coordinates(), ReporterSet::single("bob"));
        assert_ne!(a.change_id, b.change_id);
        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn identity_differs_when_payload_differs() {
        let other = ChangeKind::SetRoomCoordinates {
            room_number: 1,
            x: 1,
            y: 2,
            z: 4,
        };
        assert_ne!(coordinates(), other);
    }

    #[test]
    fn view_reports_count_not_tokens() {
        let mut reporters = ReporterSet::single("alice");
        reporters.insert("bob");
        let change = Change::new(coordinates(), reporters);
        let json = serde_json::to_value(change.view()).unwrap_or_default();
        assert_eq!(json["reporters"], 2);
        assert_eq!(json["type"], "set-room-coordinates");
        assert_eq!(json["changeId"], change.change_id.to_string());
    }

    #[test]
    fn area_changes_have_no_room() {
        let area = ChangeKind::CreateArea {
            name: String::from("Test Area"),
            area_id: 497,
        };
        assert_eq!(area.room_number(), None);
        assert_eq!(area.change_type(), ChangeType::CreateArea);
        assert_eq!(coordinates().room_number(), Some(1));
    }
}
