//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Exit directions
// ---------------------------------------------------------------------------

/// One of the twelve standard exit directions a room can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// North.
    North,
    /// South.
    South,
    /// East.
    East,
    /// West.
    West,
    /// Up.
    Up,
    /// Down.
    Down,
    /// Northeast.
    Northeast,
    /// Northwest.
    Northwest,
    /// Southeast.
    Southeast,
    /// Southwest.
    Southwest,
    /// In.
    In,
    /// Out.
    Out,
}

impl Direction {
    /// Every direction, in canonical order.
    pub const ALL: [Self; 12] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::Up,
        Self::Down,
        Self::Northeast,
        Self::Northwest,
        Self::Southeast,
        Self::Southwest,
        Self::In,
        Self::Out,
    ];

    /// The full lowercase name used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Up => "up",
            Self::Down => "down",
            Self::Northeast => "northeast",
            Self::Northwest => "northwest",
            Self::Southeast => "southeast",
            Self::Southwest => "southwest",
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// The abbreviated name used as the key of per-exit weights and locks.
    pub const fn short(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::South => "s",
            Self::East => "e",
            Self::West => "w",
            Self::Up => "up",
            Self::Down => "down",
            Self::Northeast => "ne",
            Self::Northwest => "nw",
            Self::Southeast => "se",
            Self::Southwest => "sw",
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Change type tags
// ---------------------------------------------------------------------------

/// Discriminator of a [`ChangeKind`](crate::ChangeKind), as stored and sent
/// on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Rename a room.
    RoomName,
    /// Point a standard exit at a destination.
    ModifyExit,
    /// Remove a standard exit.
    DeleteExit,
    /// Set the pathing weight of a standard exit.
    ModifyExitWeight,
    /// Point a special exit at a destination.
    ModifySpecialExit,
    /// Set the pathing weight of a special exit.
    ModifySpecialExitWeight,
    /// Lock a special exit.
    LockSpecialExit,
    /// Unlock a special exit.
    UnlockSpecialExit,
    /// Remove a special exit.
    DeleteSpecialExit,
    /// Create a blank room.
    CreateRoom,
    /// Move a room to new coordinates.
    SetRoomCoordinates,
    /// Create an empty area.
    CreateArea,
    /// Move a room into another area.
    SetRoomArea,
    /// Set the environment (terrain) of a room.
    SetRoomEnvironment,
    /// Set a user-data entry on a room.
    ModifyRoomUserData,
    /// Remove a user-data entry from a room.
    DeleteRoomUserData,
}

impl ChangeType {
    /// The kebab-case tag used on the wire and in the `changes` table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoomName => "room-name",
            Self::ModifyExit => "modify-exit",
            Self::DeleteExit => "delete-exit",
            Self::ModifyExitWeight => "modify-exit-weight",
            Self::ModifySpecialExit => "modify-special-exit",
            Self::ModifySpecialExitWeight => "modify-special-exit-weight",
            Self::LockSpecialExit => "lock-special-exit",
            Self::UnlockSpecialExit => "unlock-special-exit",
            Self::DeleteSpecialExit => "delete-special-exit",
            Self::CreateRoom => "create-room",
            Self::SetRoomCoordinates => "set-room-coordinates",
            Self::CreateArea => "create-area",
            Self::SetRoomArea => "set-room-area",
            Self::SetRoomEnvironment => "set-room-environment",
            Self::ModifyRoomUserData => "modify-room-user-data",
            Self::DeleteRoomUserData => "delete-room-user-data",
        }
    }
}

impl core::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Output formats
// ---------------------------------------------------------------------------

/// Encoding requested for a materialized map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapFormat {
    /// The map codec's native encoding.
    #[default]
    Binary,
    /// Human-readable JSON export.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_wire_names_match_serde() {
        for direction in Direction::ALL {
            let json = serde_json::to_string(&direction).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", direction.as_str()));
        }
    }

    #[test]
    fn short_names_are_unique() {
        let mut seen: Vec<&str> = Direction::ALL.iter().map(|d| d.short()).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), Direction::ALL.len());
    }

    #[test]
    fn change_type_tags_match_serde() {
        let tag = serde_json::to_string(&ChangeType::ModifySpecialExitWeight).unwrap_or_default();
        assert_eq!(tag, "\"modify-special-exit-weight\"");
        assert_eq!(
            ChangeType::ModifySpecialExitWeight.as_str(),
            "modify-special-exit-weight"
        );
    }

    #[test]
    fn map_format_parses_lowercase() {
        let format: Result<MapFormat, _> = serde_json::from_str("\"json\"");
        assert_eq!(format.ok(), Some(MapFormat::Json));
    }
}
