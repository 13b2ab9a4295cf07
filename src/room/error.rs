//! Room operation errors.

use super::ids::{PlayerId, RoomCode};
use crate::games::numble::{RoomStatus, TransitionError, ValidationError};
use crate::store::StoreError;
use derive_more::{Display, Error, From};

/// Something an operation needed that is not there.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Missing {
    /// No room under this code.
    #[display("room {}", _0)]
    Room(RoomCode),
    /// The player is not seated in the room.
    #[display("player {}", _0)]
    Player(PlayerId),
    /// The player has no opponent yet.
    #[display("opponent")]
    Opponent,
}

impl std::error::Error for Missing {}

/// The room's current state does not allow the operation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Conflict {
    /// Both seats are taken.
    #[display("room is full")]
    RoomFull,
    /// The room has moved past the phase the operation belongs to.
    #[display("game already started")]
    GameAlreadyStarted,
    /// Secrets are write-once.
    #[display("secret already set")]
    SecretAlreadySet,
    /// Guesses are only accepted while playing.
    #[display("room is {}, not playing", _0)]
    NotPlaying(RoomStatus),
    /// The other player holds the turn.
    #[display("not your turn")]
    NotYourTurn,
    /// Every generated room code was taken.
    #[display("no free room code after {} attempts", _0)]
    CodeExhausted(u32),
    /// The requested status change would go backwards.
    #[display("{}", _0)]
    Transition(TransitionError),
}

impl std::error::Error for Conflict {}

/// Broad category of a [`RoomError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorKind {
    /// Room or player missing.
    NotFound,
    /// Room state forbids the operation.
    Conflict,
    /// Malformed code or name.
    ValidationError,
    /// Store unreachable; the caller may retry.
    TransientStoreError,
    /// Store returned something unusable, or a transition broke an invariant.
    Internal,
}

/// Error returned by room operations. None are retried by this crate.
#[derive(Debug, Clone, Display, Error, From)]
pub enum RoomError {
    /// Room or player missing.
    #[display("Not found: {}", _0)]
    NotFound(Missing),
    /// Room state forbids the operation.
    #[display("Conflict: {}", _0)]
    Conflict(Conflict),
    /// Malformed input.
    #[display("Invalid: {}", _0)]
    Validation(ValidationError),
    /// Store failure.
    #[display("{}", _0)]
    Store(StoreError),
    /// A transition would leave the room inconsistent.
    #[display("Invariant violation: {}", _0)]
    #[from(skip)]
    Invariant(#[error(not(source))] String),
}

impl From<TransitionError> for RoomError {
    fn from(err: TransitionError) -> Self {
        RoomError::Conflict(Conflict::Transition(err))
    }
}

impl RoomError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoomError::NotFound(_) => ErrorKind::NotFound,
            RoomError::Conflict(_) => ErrorKind::Conflict,
            RoomError::Validation(_) => ErrorKind::ValidationError,
            RoomError::Store(e) if e.is_transient() => ErrorKind::TransientStoreError,
            RoomError::Store(_) | RoomError::Invariant(_) => ErrorKind::Internal,
        }
    }

    /// True if the same call may succeed later.
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::TransientStoreError
    }
}
