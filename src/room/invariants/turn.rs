//! Turn/winner invariant.

use super::Invariant;
use crate::games::numble::RoomStatus;
use crate::room::Room;

/// Invariant: a turn holder exists exactly while `playing` and is seated;
/// a winner exists exactly when `finished`.
pub struct TurnStateInvariant;

impl Invariant<Room> for TurnStateInvariant {
    fn holds(room: &Room) -> bool {
        let playing = *room.status() == RoomStatus::Playing;
        let finished = *room.status() == RoomStatus::Finished;

        let turn_ok = match room.current_turn_player_id() {
            Some(id) => playing && room.player(id).is_some(),
            None => !playing,
        };
        let winner_ok = room.winner_player_id().is_some() == finished;

        turn_ok && winner_ok
    }

    fn description() -> &'static str {
        "Turn is held only while playing; a winner exists only once finished"
    }
}
