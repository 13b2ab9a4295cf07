//! Room lifecycle phases.
//!
//! A room only ever moves forward:
//! `Waiting -> Ready -> Playing -> Finished`. Skipping ahead is allowed
//! (a host leaving a `Ready` room finishes it); going back never is.

use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

/// Lifecycle status of a room.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoomStatus {
    /// Host alone, room open for one joiner.
    Waiting,
    /// Two players present, secrets not yet both set.
    Ready,
    /// Both secrets set, turns alternating.
    Playing,
    /// Terminal.
    Finished,
}

/// A rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Cannot move room from {} to {}", from, to)]
pub struct TransitionError {
    /// Status before the attempted change.
    pub from: RoomStatus,
    /// Requested status.
    pub to: RoomStatus,
}

impl std::error::Error for TransitionError {}

impl RoomStatus {
    /// Checks that moving to `next` does not go backwards.
    ///
    /// Staying in the same status is allowed; it lets idempotent writes
    /// (two clients both starting the game) succeed.
    #[instrument]
    pub fn advance_to(self, next: RoomStatus) -> Result<RoomStatus, TransitionError> {
        if next < self {
            warn!(from = %self, to = %next, "Backward transition rejected");
            return Err(TransitionError { from: self, to: next });
        }
        Ok(next)
    }

    /// True once no further moves are possible.
    pub fn is_terminal(self) -> bool {
        self == RoomStatus::Finished
    }

    /// True while the room still accepts a second player.
    pub fn accepts_joiners(self) -> bool {
        self == RoomStatus::Waiting
    }

    /// True while players may still choose their secrets.
    pub fn accepts_secrets(self) -> bool {
        matches!(self, RoomStatus::Waiting | RoomStatus::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_forward_moves_allowed() {
        assert_eq!(
            RoomStatus::Waiting.advance_to(RoomStatus::Ready),
            Ok(RoomStatus::Ready)
        );
        assert_eq!(
            RoomStatus::Ready.advance_to(RoomStatus::Finished),
            Ok(RoomStatus::Finished)
        );
    }

    #[test]
    fn test_no_backward_moves() {
        for from in RoomStatus::iter() {
            for to in RoomStatus::iter().filter(|to| *to < from) {
                assert!(from.advance_to(to).is_err(), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&RoomStatus::Playing).expect("serialize"),
            "\"playing\""
        );
        assert_eq!("finished".parse::<RoomStatus>(), Ok(RoomStatus::Finished));
    }
}
