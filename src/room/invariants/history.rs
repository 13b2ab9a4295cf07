//! Guess history invariant.

use super::Invariant;
use crate::room::Room;

/// Invariant: every seated player's `guessCount` equals the guesses stored
/// for them, and every stored score satisfies
/// `position <= match <= 4`.
pub struct GuessHistoryInvariant;

impl Invariant<Room> for GuessHistoryInvariant {
    fn holds(room: &Room) -> bool {
        let counts_match = room
            .players()
            .values()
            .all(|p| room.guesses_by(p.id()).count() == *p.guess_count() as usize);

        let scores_bounded = room.guess_history().all(|g| g.feedback().is_ok());

        counts_match && scores_bounded
    }

    fn description() -> &'static str {
        "Guess counts match the history and every score is bounded"
    }
}
