//! Rooms: shared game sessions stored in a [`RoomStore`](crate::store::RoomStore).
//!
//! # Lifecycle
//!
//! ```text
//! create ─► waiting ─join─► ready ─both secrets─► playing ─winning guess─► finished
//!                             └──────────── player leaves ───────────────────┘
//! ```
//!
//! Transitions are planned as pure functions in [`transitions`] and written
//! by [`RoomService`] as one atomic patch each.

mod contracts;
mod error;
mod ids;
mod invariants;
mod model;
mod service;
pub mod transitions;
mod watch;

pub use contracts::{PlayerSeated, PlayersTurn, RoomAcceptsJoiner, SecretWritable, TransitionContract};
pub use error::{Conflict, ErrorKind, Missing, RoomError};
pub use ids::{PlayerId, ROOM_CODE_LETTERS, RoomCode};
pub use invariants::{
    GuessHistoryInvariant, Invariant, InvariantSet, InvariantViolation, RoomInvariants,
    RosterInvariant, TurnStateInvariant,
};
pub use model::{GuessOutcome, GuessRecord, Player, PlayerSession, Room};
pub use service::RoomService;
pub use watch::{RoomEvent, RoomWatch};
