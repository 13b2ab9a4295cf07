//! Room document model.
//!
//! These types mirror the JSON stored at `rooms/{code}`. Optional fields are
//! omitted from the document when unset.

use super::ids::{PlayerId, RoomCode};
use crate::games::numble::{Code, Feedback, InvalidFeedback, RoomStatus};
use crate::store::{Patch, StoreError};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::instrument;

/// Document field names, shared by the model and the transition patches.
pub(crate) mod fields {
    pub const STATUS: &str = "status";
    pub const LAST_ACTIVITY_AT: &str = "lastActivityAt";
    pub const CURRENT_TURN: &str = "currentTurnPlayerId";
    pub const WINNER: &str = "winnerPlayerId";
    pub const PLAYERS: &str = "players";
    pub const GUESSES: &str = "guesses";
    pub const SECRET: &str = "secret";
    pub const READY: &str = "ready";
    pub const GUESS_COUNT: &str = "guessCount";
}

/// A player seated in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    id: PlayerId,
    name: String,
    #[serde(default)]
    is_host: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret: Option<Code>,
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    guess_count: u32,
}

impl Player {
    /// A freshly seated player: not ready, no secret, no guesses.
    #[instrument(skip(name))]
    pub fn seated(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_host,
            secret: None,
            ready: false,
            guess_count: 0,
        }
    }

    /// This player as the room's host.
    pub fn promoted(&self) -> Self {
        Self {
            is_host: true,
            ..self.clone()
        }
    }
}

/// One scored guess. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct GuessRecord {
    player_id: PlayerId,
    digits: Code,
    match_count: u8,
    position_count: u8,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

impl GuessRecord {
    /// Builds a record from a scored guess.
    pub fn new(player_id: PlayerId, digits: Code, feedback: Feedback, timestamp: DateTime<Utc>) -> Self {
        Self {
            player_id,
            digits,
            match_count: *feedback.match_count(),
            position_count: *feedback.position_count(),
            timestamp,
        }
    }

    /// The stored counts as [`Feedback`], if they are possible at all.
    pub fn feedback(&self) -> Result<Feedback, InvalidFeedback> {
        Feedback::try_new(self.match_count, self.position_count)
    }
}

/// A two-player game session keyed by a shareable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    code: RoomCode,
    status: RoomStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    last_activity_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_turn_player_id: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    winner_player_id: Option<PlayerId>,
    #[serde(default)]
    players: BTreeMap<PlayerId, Player>,
    /// Keyed by collection id, which sorts in insertion order.
    #[serde(default)]
    guesses: BTreeMap<String, GuessRecord>,
}

impl Room {
    /// A new room in `waiting` with only the host seated.
    #[instrument(skip(host), fields(host_id = %host.id))]
    pub fn open(code: RoomCode, host: Player, now: DateTime<Utc>) -> Self {
        let mut players = BTreeMap::new();
        players.insert(host.id.clone(), host);
        Self {
            code,
            status: RoomStatus::Waiting,
            created_at: now,
            last_activity_at: now,
            current_turn_player_id: None,
            winner_player_id: None,
            players,
            guesses: BTreeMap::new(),
        }
    }

    /// Decodes a room document.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Encodes the room as a document.
    pub fn to_value(&self) -> Result<Value, StoreError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Returns the room as it would look after `patch` is applied.
    #[instrument(skip(self, patch), fields(code = %self.code))]
    pub fn apply(&self, patch: &Patch) -> Result<Room, StoreError> {
        let mut doc = self.to_value()?;
        patch.apply_to(&mut doc)?;
        Room::from_value(doc)
    }

    /// Looks up a seated player.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// The host, if still seated.
    pub fn host(&self) -> Option<&Player> {
        self.players.values().find(|p| p.is_host)
    }

    /// The other seated player.
    pub fn opponent_of(&self, id: &PlayerId) -> Option<&Player> {
        self.players.values().find(|p| &p.id != id)
    }

    /// Guesses in the order they were made.
    pub fn guess_history(&self) -> impl Iterator<Item = &GuessRecord> {
        self.guesses.values()
    }

    /// Guesses made by one player, in order.
    pub fn guesses_by<'a>(&'a self, id: &'a PlayerId) -> impl Iterator<Item = &'a GuessRecord> + 'a {
        self.guesses.values().filter(move |g| &g.player_id == id)
    }

    /// True when both seats are taken and both players have a secret.
    pub fn both_ready(&self) -> bool {
        self.players.len() == 2 && self.players.values().all(|p| p.ready && p.secret.is_some())
    }

    /// True if it is `id`'s turn to guess.
    pub fn is_players_turn(&self, id: &PlayerId) -> bool {
        self.status == RoomStatus::Playing && self.current_turn_player_id.as_ref() == Some(id)
    }
}

/// Explicit identity of a player inside a room, returned by create/join and
/// passed to every operation that acts on that player's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSession {
    room_code: RoomCode,
    player_id: PlayerId,
}

/// What a submitted guess achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters, new)]
pub struct GuessOutcome {
    feedback: Feedback,
    won: bool,
}
