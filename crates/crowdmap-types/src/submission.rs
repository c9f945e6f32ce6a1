//! Inbound change submissions and their validation.
//!
//! A submission is a [`ChangeKind`] payload plus the single reporter who
//! observed it. Submissions are validated before they reach the ledger so a
//! malformed payload never creates or touches a record.

use serde::{Deserialize, Serialize};

use crate::change::ChangeKind;
use crate::reporters::ReporterSet;

/// Reasons a submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The reporter token is empty or whitespace.
    #[error("reporter must not be empty")]
    EmptyReporter,

    /// A required text field is empty or whitespace.
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A room or area number is outside the accepted range.
    #[error("field `{field}` must not be negative, got {value}")]
    NegativeNumber {
        /// The offending field.
        field: &'static str,
        /// The rejected value.
        value: i32,
    },
}

/// One contributor's report of one edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSubmission {
    /// The proposed edit, flattened so the wire shape is a single object.
    #[serde(flatten)]
    pub change: ChangeKind,
    /// Who observed the edit. May be a real name, a pseudonym, or an opaque id.
    pub reporter: String,
}

impl ChangeSubmission {
    /// Create a submission.
    pub fn new(change: ChangeKind, reporter: impl Into<String>) -> Self {
        Self {
            change,
            reporter: reporter.into(),
        }
    }

    /// Check the submission for malformed fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`SubmissionError`] found.
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.reporter.trim().is_empty() {
            return Err(SubmissionError::EmptyReporter);
        }
        if let Some(room_number) = self.change.room_number() {
            non_negative("roomNumber", room_number)?;
        }
        match &self.change {
            ChangeKind::RoomName { name, .. } => non_empty("name", name),
            ChangeKind::ModifySpecialExit { exit_command, .. }
            | ChangeKind::ModifySpecialExitWeight { exit_command, .. }
            | ChangeKind::LockSpecialExit { exit_command, .. }
            | ChangeKind::UnlockSpecialExit { exit_command, .. }
            | ChangeKind::DeleteSpecialExit { exit_command, .. } => {
                non_empty("exitCommand", exit_command)
            }
            ChangeKind::CreateArea { name, .. } => non_empty("name", name),
            ChangeKind::ModifyRoomUserData { key, .. }
            | ChangeKind::DeleteRoomUserData { key, .. } => non_empty("key", key),
            ChangeKind::ModifyExit { .. }
            | ChangeKind::DeleteExit { .. }
            | ChangeKind::ModifyExitWeight { .. }
            | ChangeKind::CreateRoom { .. }
            | ChangeKind::SetRoomCoordinates { .. }
            | ChangeKind::SetRoomArea { .. }
            | ChangeKind::SetRoomEnvironment { .. } => Ok(()),
        }
    }

    /// Split into the identity payload and a one-element reporter set.
    pub fn into_parts(self) -> (ChangeKind, ReporterSet) {
        (self.change, ReporterSet::single(self.reporter))
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), SubmissionError> {
    if value.trim().is_empty() {
        Err(SubmissionError::EmptyField(field))
    } else {
        Ok(())
    }
}

const fn non_negative(field: &'static str, value: i32) -> Result<(), SubmissionError> {
    if value < 0 {
        Err(SubmissionError::NegativeNumber { field, value })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::Direction;

    #[test]
    fn parses_flat_wire_shape() {
        let raw = r#"{
            "type": "delete-exit",
            "roomNumber": 39478,
            "direction": "east",
            "reporter": "Test Reporter"
        }"#;
        let parsed: Result<ChangeSubmission, _> = serde_json::from_str(raw);
        let expected = ChangeSubmission::new(
            ChangeKind::DeleteExit {
                room_number: 39478,
                direction: Direction::East,
            },
            "Test Reporter",
        );
        assert_eq!(parsed.ok(), Some(expected));
    }

    #[test]
    fn rejects_unknown_change_type() {
        let raw = r#"{"type": "teleport", "roomNumber": 1, "reporter": "a"}"#;
        let parsed: Result<ChangeSubmission, _> = serde_json::from_str(raw);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_blank_reporter() {
        let submission = ChangeSubmission::new(ChangeKind::CreateRoom { room_number: 5 }, "  ");
        assert_eq!(submission.validate(), Err(SubmissionError::EmptyReporter));
    }

    #[test]
    fn rejects_empty_exit_command() {
        let submission = ChangeSubmission::new(
            ChangeKind::DeleteSpecialExit {
                room_number: 5,
                exit_command: String::new(),
            },
            "alice",
        );
        assert_eq!(
            submission.validate(),
            Err(SubmissionError::EmptyField("exitCommand"))
        );
    }

    #[test]
    fn rejects_negative_room() {
        let submission =
            ChangeSubmission::new(ChangeKind::CreateRoom { room_number: -3 }, "alice");
        assert!(matches!(
            submission.validate(),
            Err(SubmissionError::NegativeNumber { value: -3, .. })
        ));
    }

    #[test]
    fn accepts_well_formed_submission() {
        let submission = ChangeSubmission::new(
            ChangeKind::ModifyRoomUserData {
                room_number: 1,
                key: String::from("gotoMapping"),
                value: String::from("market"),
            },
            "alice",
        );
        assert_eq!(submission.validate(), Ok(()));
        let (_, reporters) = submission.into_parts();
        assert!(reporters.contains("alice"));
    }
}
