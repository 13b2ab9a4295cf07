//! Roster invariant: seat count and host uniqueness.

use super::Invariant;
use crate::games::numble::RoomStatus;
use crate::room::Room;

/// Invariant: at most two players, exactly one host, and a seat count that
/// fits the phase.
///
/// - `waiting` has exactly one player (the host);
/// - `playing` has two players, both holding a secret;
/// - an empty roster is never stored (the room is deleted instead).
pub struct RosterInvariant;

impl Invariant<Room> for RosterInvariant {
    fn holds(room: &Room) -> bool {
        let players = room.players();
        if players.is_empty() || players.len() > 2 {
            return false;
        }
        if players.values().filter(|p| *p.is_host()).count() != 1 {
            return false;
        }
        if players.iter().any(|(key, p)| key != p.id()) {
            return false;
        }
        match room.status() {
            RoomStatus::Waiting => players.len() == 1,
            RoomStatus::Playing => {
                players.len() == 2 && players.values().all(|p| p.secret().is_some() && *p.ready())
            }
            RoomStatus::Ready | RoomStatus::Finished => true,
        }
    }

    fn description() -> &'static str {
        "Room seats one host and at most one guest, as its phase requires"
    }
}
