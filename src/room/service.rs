//! Room lifecycle over a [`RoomStore`].

use super::contracts::TransitionContract;
use super::error::{Conflict, Missing, RoomError};
use super::transitions::{LeavePlan, plan_guess, plan_join, plan_leave, plan_set_secret, plan_start};
use super::model::fields::LAST_ACTIVITY_AT;
use super::{GuessOutcome, Player, PlayerId, PlayerSession, Room, RoomCode, RoomWatch};
use crate::config::NumbleConfig;
use crate::games::numble::{RoomStatus, ValidationError, validate};
use crate::store::{DocPath, Patch, RoomStore, StoreErrorKind};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

/// Drives rooms through their lifecycle.
///
/// Every mutating call reads the current room, plans the transition against
/// that snapshot and writes it as a single atomic patch. Errors are returned
/// to the caller as-is; nothing is retried.
#[derive(Debug, Clone)]
pub struct RoomService<S> {
    store: S,
    config: NumbleConfig,
}

impl<S: RoomStore> RoomService<S> {
    /// Creates a service over `store`.
    #[instrument(skip(store))]
    pub fn new(store: S, config: NumbleConfig) -> Self {
        info!("Creating room service");
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The active configuration.
    pub fn config(&self) -> &NumbleConfig {
        &self.config
    }

    fn room_path(&self, code: &RoomCode) -> String {
        format!("{}/{}", self.config.rooms_root(), code)
    }

    fn check_name(&self, name: &str) -> Result<String, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let max = *self.config.max_name_len();
        if name.chars().count() > max {
            return Err(ValidationError::NameTooLong(max));
        }
        Ok(name.to_string())
    }

    async fn load(&self, code: &RoomCode) -> Result<Room, RoomError> {
        self.get_room(code)
            .await?
            .ok_or_else(|| RoomError::NotFound(Missing::Room(code.clone())))
    }

    async fn commit(&self, room: &Room, patch: &Patch) -> Result<Room, RoomError> {
        let after = TransitionContract::post(room, patch)?;
        self.store
            .update_fields(&self.room_path(room.code()), patch)
            .await?;
        Ok(after)
    }

    /// Opens a new room with `host_name` as host.
    #[instrument(skip(self))]
    pub async fn create_room(&self, host_name: &str) -> Result<PlayerSession, RoomError> {
        let name = self.check_name(host_name)?;
        let host_id = PlayerId::generate();
        let attempts = *self.config.code_attempts();

        for attempt in 1..=attempts {
            let code = RoomCode::generate();
            let room = Room::open(code.clone(), Player::seated(host_id.clone(), name.clone(), true), Utc::now());
            match self
                .store
                .create_document(&self.room_path(&code), room.to_value()?)
                .await
            {
                Ok(()) => {
                    info!(%code, host_id = %host_id, "Room created");
                    return Ok(PlayerSession::new(code, host_id));
                }
                Err(e) if e.kind == StoreErrorKind::AlreadyExists => {
                    warn!(%code, attempt, "Room code taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Conflict::CodeExhausted(attempts).into())
    }

    /// Seats `name` as the second player of room `code`.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn join_room(&self, code: &RoomCode, name: &str) -> Result<PlayerSession, RoomError> {
        let name = self.check_name(name)?;
        let room = self.load(code).await?;

        let guest = Player::seated(PlayerId::generate(), name, false);
        let patch = plan_join(&room, &guest, Utc::now())?;
        self.commit(&room, &patch).await?;

        info!(player_id = %guest.id(), "Player joined");
        Ok(PlayerSession::new(code.clone(), guest.id().clone()))
    }

    /// Sets the session player's secret. Returns the room status afterwards,
    /// which is `playing` once both secrets are in.
    #[instrument(skip(self, session, secret), fields(code = %session.room_code(), player_id = %session.player_id()))]
    pub async fn set_secret(
        &self,
        session: &PlayerSession,
        secret: &str,
    ) -> Result<RoomStatus, RoomError> {
        let secret = validate(secret)?;
        let room = self.load(session.room_code()).await?;

        let patch = plan_set_secret(&room, session.player_id(), secret, Utc::now())?;
        let after = self.commit(&room, &patch).await?;
        if *after.status() == RoomStatus::Playing {
            info!("Both secrets set, game started");
            return Ok(RoomStatus::Playing);
        }

        // The opponent may have written their secret after our read.
        let latest = self.load(session.room_code()).await?;
        match plan_start(&latest, Utc::now())? {
            Some(start) => {
                self.commit(&latest, &start).await?;
                info!("Both secrets set, game started");
                Ok(RoomStatus::Playing)
            }
            None => {
                debug!(status = %latest.status(), "Waiting for opponent's secret");
                Ok(*latest.status())
            }
        }
    }

    /// Submits a guess for the session player.
    #[instrument(skip(self, session, guess), fields(code = %session.room_code(), player_id = %session.player_id()))]
    pub async fn submit_guess(
        &self,
        session: &PlayerSession,
        guess: &str,
    ) -> Result<GuessOutcome, RoomError> {
        let guess = validate(guess)?;
        let room = self.load(session.room_code()).await?;

        let room_path = self.room_path(session.room_code());
        let child = self
            .store
            .append_to_collection(&format!("{}/guesses", room_path))
            .await?;
        let child = DocPath::parse(&child)?;
        let key = child
            .key()
            .ok_or_else(|| RoomError::Invariant("collection returned an empty key".to_string()))?;

        let (patch, feedback) = plan_guess(&room, session.player_id(), guess, key, Utc::now())?;
        self.commit(&room, &patch).await?;

        info!(%guess, %feedback, won = feedback.is_win(), "Guess recorded");
        Ok(GuessOutcome::new(feedback, feedback.is_win()))
    }

    /// Removes the session player. Leaving a room that no longer exists is
    /// not an error.
    #[instrument(skip(self, session), fields(code = %session.room_code(), player_id = %session.player_id()))]
    pub async fn leave_room(&self, session: &PlayerSession) -> Result<(), RoomError> {
        let Some(room) = self.get_room(session.room_code()).await? else {
            debug!("Room already gone");
            return Ok(());
        };

        match plan_leave(&room, session.player_id(), Utc::now())? {
            LeavePlan::Nothing => {}
            LeavePlan::DeleteRoom => {
                self.store
                    .delete_document(&self.room_path(room.code()))
                    .await?;
                info!("Last player left, room deleted");
            }
            LeavePlan::Update(patch) => {
                let after = self.commit(&room, &patch).await?;
                info!(status = %after.status(), "Player left");
            }
        }
        Ok(())
    }

    /// Reads a room once.
    #[instrument(skip(self), fields(code = %code))]
    pub async fn get_room(&self, code: &RoomCode) -> Result<Option<Room>, RoomError> {
        let value = self.store.read_document(&self.room_path(code)).await?;
        let room = value.map(Room::from_value).transpose()?;
        debug!(found = room.is_some(), "Room read");
        Ok(room)
    }

    /// Watches a room; see [`RoomWatch`].
    #[instrument(skip(self), fields(code = %code))]
    pub async fn watch_room(&self, code: &RoomCode) -> Result<RoomWatch, RoomError> {
        let subscription = self.store.subscribe(&self.room_path(code)).await?;
        info!("Watching room");
        Ok(RoomWatch::new(code.clone(), subscription))
    }

    /// Deletes every room idle for at least the configured TTL and returns
    /// their codes.
    ///
    /// Documents that no longer decode as a room are judged by their raw
    /// `lastActivityAt`, and deleted outright when even that is missing.
    /// A failed delete does not stop the sweep: the codes reaped so far are
    /// returned, and the error only surfaces when nothing could be reaped.
    #[instrument(skip(self))]
    pub async fn reap_expired(&self, now: DateTime<Utc>) -> Result<Vec<RoomCode>, RoomError> {
        let ttl = self.config.room_ttl();
        let Some(Value::Object(rooms)) = self.store.read_document(self.config.rooms_root()).await? else {
            debug!("No rooms to reap");
            return Ok(Vec::new());
        };

        let mut reaped = Vec::new();
        let mut failure = None;
        for (key, value) in rooms {
            let last_activity = match Room::from_value(value.clone()) {
                Ok(room) => Some(*room.last_activity_at()),
                Err(e) => {
                    warn!(%key, error = %e, "Room does not decode, using raw activity time");
                    value
                        .get(LAST_ACTIVITY_AT)
                        .and_then(Value::as_i64)
                        .and_then(DateTime::<Utc>::from_timestamp_millis)
                }
            };
            let expired = last_activity.is_none_or(|at| {
                at.checked_add_signed(ttl)
                    .is_some_and(|deadline| deadline <= now)
            });
            if !expired {
                continue;
            }

            let path = format!("{}/{}", self.config.rooms_root(), key);
            if let Err(e) = self.store.delete_document(&path).await {
                warn!(%key, error = %e, reaped = reaped.len(), "Failed to reap room");
                if failure.is_none() {
                    failure = Some(e);
                }
                continue;
            }
            match RoomCode::parse(&key) {
                Ok(code) => {
                    info!(%code, "Reaped idle room");
                    reaped.push(code);
                }
                Err(_) => warn!(%key, "Reaped document with a malformed room code"),
            }
        }

        match failure {
            Some(e) if reaped.is_empty() => Err(e.into()),
            _ => Ok(reaped),
        }
    }
}
