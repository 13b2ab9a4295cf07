//! Preconditions and postconditions for room transitions.
//!
//! Every transition is validated against the current snapshot before a
//! patch is built, and the resulting room is checked against
//! [`RoomInvariants`] before the patch is written.

use super::error::{Conflict, Missing, RoomError};
use super::invariants::{InvariantSet, RoomInvariants};
use super::{Player, PlayerId, Room};
use crate::games::numble::RoomStatus;
use crate::store::Patch;
use tracing::{instrument, warn};

/// Precondition: the room is open and has a free seat.
pub struct RoomAcceptsJoiner;

impl RoomAcceptsJoiner {
    /// Checks the room can seat another player.
    #[instrument(skip(room), fields(code = %room.code(), status = %room.status()))]
    pub fn check(room: &Room) -> Result<(), RoomError> {
        if !room.status().accepts_joiners() {
            warn!("Join rejected: game already started");
            return Err(Conflict::GameAlreadyStarted.into());
        }
        if room.players().len() >= 2 {
            warn!("Join rejected: room full");
            return Err(Conflict::RoomFull.into());
        }
        Ok(())
    }
}

/// Precondition: the player is seated.
pub struct PlayerSeated;

impl PlayerSeated {
    /// Returns the seated player.
    #[instrument(skip(room), fields(code = %room.code()))]
    pub fn check<'a>(room: &'a Room, id: &PlayerId) -> Result<&'a Player, RoomError> {
        room.player(id).ok_or_else(|| {
            warn!(player_id = %id, "Player not seated");
            Missing::Player(id.clone()).into()
        })
    }
}

/// Precondition: the player may still choose a secret.
pub struct SecretWritable;

impl SecretWritable {
    /// Checks phase and write-once rule.
    #[instrument(skip(room, player), fields(code = %room.code(), player_id = %player.id()))]
    pub fn check(room: &Room, player: &Player) -> Result<(), RoomError> {
        if !room.status().accepts_secrets() {
            warn!(status = %room.status(), "Secret rejected: game already started");
            return Err(Conflict::GameAlreadyStarted.into());
        }
        if player.secret().is_some() {
            warn!("Secret rejected: already set");
            return Err(Conflict::SecretAlreadySet.into());
        }
        Ok(())
    }
}

/// Precondition: the room is playing and the turn belongs to the player.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Checks the player may guess now.
    #[instrument(skip(room), fields(code = %room.code()))]
    pub fn check(room: &Room, id: &PlayerId) -> Result<(), RoomError> {
        if *room.status() != RoomStatus::Playing {
            warn!(status = %room.status(), "Guess rejected: not playing");
            return Err(Conflict::NotPlaying(*room.status()).into());
        }
        if !room.is_players_turn(id) {
            warn!(
                player_id = %id,
                turn = ?room.current_turn_player_id(),
                "Guess rejected: out of turn"
            );
            return Err(Conflict::NotYourTurn.into());
        }
        Ok(())
    }
}

/// Postcondition: applying `patch` to `before` keeps every invariant and
/// never moves the status backwards.
pub struct TransitionContract;

impl TransitionContract {
    /// Returns the room as it will look after the patch.
    #[instrument(skip(before, patch), fields(code = %before.code(), writes = patch.len()))]
    pub fn post(before: &Room, patch: &Patch) -> Result<Room, RoomError> {
        let after = before.apply(patch)?;
        before.status().advance_to(*after.status())?;
        RoomInvariants::check_all(&after).map_err(|violations| {
            let descriptions = violations
                .iter()
                .map(|v| v.description.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            warn!(%descriptions, "Postcondition failed");
            RoomError::Invariant(format!("Postcondition failed: {}", descriptions))
        })?;
        Ok(after)
    }
}
