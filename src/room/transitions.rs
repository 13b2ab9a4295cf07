//! Pure room transitions.
//!
//! Each function reads a room snapshot and returns the [`Patch`] that moves
//! it to the next state. Nothing here touches the store, so the whole state
//! machine can be exercised on plain values.

use super::contracts::{PlayerSeated, PlayersTurn, RoomAcceptsJoiner, SecretWritable};
use super::error::{Missing, RoomError};
use super::model::fields::{
    CURRENT_TURN, GUESS_COUNT, GUESSES, LAST_ACTIVITY_AT, PLAYERS, READY, SECRET, STATUS,
    WINNER,
};
use super::{GuessRecord, Player, PlayerId, Room};
use crate::games::numble::{Code, Feedback, RoomStatus, score};
use crate::store::Patch;
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, instrument};

/// What leaving a room requires.
#[derive(Debug, Clone, PartialEq)]
pub enum LeavePlan {
    /// The player was not seated; nothing to do.
    Nothing,
    /// The leaver was the last player; delete the whole room.
    DeleteRoom,
    /// Remove the leaver and apply the follow-up changes.
    Update(Patch),
}

fn player_field(id: &PlayerId, field: &str) -> String {
    format!("{}/{}/{}", PLAYERS, id, field)
}

fn touch(patch: &mut Patch, now: DateTime<Utc>) {
    patch.set(LAST_ACTIVITY_AT, json!(now.timestamp_millis()));
}

fn set_status(patch: &mut Patch, room: &Room, next: RoomStatus) -> Result<(), RoomError> {
    let next = room.status().advance_to(next)?;
    patch.set_json(STATUS, &next)?;
    Ok(())
}

/// Seats `guest` and moves the room to `ready`.
#[instrument(skip(room, guest), fields(code = %room.code(), guest_id = %guest.id()))]
pub fn plan_join(room: &Room, guest: &Player, now: DateTime<Utc>) -> Result<Patch, RoomError> {
    RoomAcceptsJoiner::check(room)?;

    let mut patch = Patch::new();
    patch.set_json(format!("{}/{}", PLAYERS, guest.id()), guest)?;
    set_status(&mut patch, room, RoomStatus::Ready)?;
    touch(&mut patch, now);

    info!("Planned join");
    Ok(patch)
}

/// Stores the player's secret and marks them ready. If the opponent is
/// already ready the same patch starts the game.
#[instrument(skip(room, secret), fields(code = %room.code()))]
pub fn plan_set_secret(
    room: &Room,
    id: &PlayerId,
    secret: Code,
    now: DateTime<Utc>,
) -> Result<Patch, RoomError> {
    let player = PlayerSeated::check(room, id)?;
    SecretWritable::check(room, player)?;

    let mut patch = Patch::new();
    patch.set_json(player_field(id, SECRET), &secret)?;
    patch.set(player_field(id, READY), json!(true));
    touch(&mut patch, now);

    let after = room.apply(&patch)?;
    if let Some(start) = plan_start(&after, now)? {
        debug!("Opponent already ready, starting in the same write");
        patch.merge(start);
    }

    info!(player_id = %id, "Planned secret");
    Ok(patch)
}

/// Starts the game if both players are ready and it has not started yet.
/// The host always guesses first.
#[instrument(skip(room), fields(code = %room.code(), status = %room.status()))]
pub fn plan_start(room: &Room, now: DateTime<Utc>) -> Result<Option<Patch>, RoomError> {
    if *room.status() != RoomStatus::Ready || !room.both_ready() {
        return Ok(None);
    }
    let host = room
        .host()
        .ok_or_else(|| RoomError::Invariant("ready room has no host".to_string()))?;

    let mut patch = Patch::new();
    set_status(&mut patch, room, RoomStatus::Playing)?;
    patch.set_json(CURRENT_TURN, host.id())?;
    touch(&mut patch, now);

    info!(first = %host.id(), "Planned game start");
    Ok(Some(patch))
}

/// Scores a guess against the opponent's secret, records it and either
/// passes the turn or finishes the game.
///
/// `guess_key` is the collection key reserved for the new guess record.
#[instrument(skip(room, guess), fields(code = %room.code()))]
pub fn plan_guess(
    room: &Room,
    id: &PlayerId,
    guess: Code,
    guess_key: &str,
    now: DateTime<Utc>,
) -> Result<(Patch, Feedback), RoomError> {
    let player = PlayerSeated::check(room, id)?;
    PlayersTurn::check(room, id)?;

    let opponent = room
        .opponent_of(id)
        .ok_or(RoomError::NotFound(Missing::Opponent))?;
    let secret = opponent
        .secret()
        .ok_or_else(|| RoomError::Invariant("opponent has no secret while playing".to_string()))?;

    let feedback = score(&secret, &guess);
    let record = GuessRecord::new(id.clone(), guess, feedback, now);

    let mut patch = Patch::new();
    patch.set_json(format!("{}/{}", GUESSES, guess_key), &record)?;
    patch.set(player_field(id, GUESS_COUNT), json!(player.guess_count() + 1));

    if feedback.is_win() {
        set_status(&mut patch, room, RoomStatus::Finished)?;
        patch.set_json(WINNER, id)?;
        patch.delete(CURRENT_TURN);
        info!(winner = %id, guesses = player.guess_count() + 1, "Planned winning guess");
    } else {
        patch.set_json(CURRENT_TURN, opponent.id())?;
        debug!(%feedback, next = %opponent.id(), "Planned guess");
    }
    touch(&mut patch, now);

    Ok((patch, feedback))
}

/// Removes a player.
///
/// The last player leaving deletes the room. Otherwise the remaining player
/// becomes host, and a room that was `ready` or `playing` finishes with the
/// remaining player winning by forfeit.
#[instrument(skip(room), fields(code = %room.code(), status = %room.status()))]
pub fn plan_leave(room: &Room, id: &PlayerId, now: DateTime<Utc>) -> Result<LeavePlan, RoomError> {
    let Some(leaver) = room.player(id) else {
        debug!(player_id = %id, "Leaver not seated");
        return Ok(LeavePlan::Nothing);
    };
    let Some(remaining) = room.opponent_of(id) else {
        info!(player_id = %id, "Last player leaving");
        return Ok(LeavePlan::DeleteRoom);
    };

    let mut patch = Patch::new();
    patch.delete(format!("{}/{}", PLAYERS, id));
    if *leaver.is_host() {
        // Whole record, so a concurrent leave of `remaining` cannot leave a
        // stub behind.
        patch.set_json(format!("{}/{}", PLAYERS, remaining.id()), &remaining.promoted())?;
    }
    if matches!(room.status(), RoomStatus::Ready | RoomStatus::Playing) {
        set_status(&mut patch, room, RoomStatus::Finished)?;
        patch.set_json(WINNER, remaining.id())?;
        patch.delete(CURRENT_TURN);
        info!(winner = %remaining.id(), "Planned forfeit");
    }
    touch(&mut patch, now);

    Ok(LeavePlan::Update(patch))
}
