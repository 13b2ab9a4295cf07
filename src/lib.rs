//! Numble library - two-player code guessing over a realtime document store
//!
//! Each player hides a code of four distinct digits (1-9); players take
//! turns guessing the other's code and are told how many guessed digits
//! occur in the secret (match) and how many sit in the right slot
//! (position). Four in position wins.
//!
//! # Architecture
//!
//! - **Games**: scoring, code validation and the room lifecycle phases
//! - **Store**: realtime JSON document store trait plus an in-memory implementation
//! - **Room**: room document model, pure transitions, invariants and the
//!   [`RoomService`] that drives them over a store
//!
//! # Example
//!
//! ```no_run
//! use numble::{MemoryStore, NumbleConfig, RoomService};
//!
//! # async fn example() -> Result<(), numble::RoomError> {
//! let service = RoomService::new(MemoryStore::new(), NumbleConfig::default());
//! let host = service.create_room("Ada").await?;
//! let guest = service.join_room(host.room_code(), "Grace").await?;
//! service.set_secret(&host, "1234").await?;
//! service.set_secret(&guest, "5678").await?;
//! let outcome = service.submit_guess(&host, "5678").await?;
//! assert!(*outcome.won());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod games;
mod room;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, NumbleConfig, ROOM_TTL_ENV};

// Crate-level exports - Game rules
pub use games::numble::{
    CODE_LEN, Code, Feedback, InvalidFeedback, RoomStatus, TransitionError, ValidationError, score, score_str,
    validate,
};

// Crate-level exports - Store
pub use store::{DocPath, MemoryStore, Patch, RoomStore, Snapshot, StoreError, StoreErrorKind, Subscription};

// Crate-level exports - Rooms
pub use room::transitions;
pub use room::{
    Conflict, ErrorKind, GuessHistoryInvariant, GuessOutcome, GuessRecord, Invariant,
    InvariantSet, InvariantViolation, Missing, Player, PlayerId, PlayerSeated, PlayerSession,
    PlayersTurn, ROOM_CODE_LETTERS, Room, RoomAcceptsJoiner, RoomCode, RoomError, RoomEvent,
    RoomInvariants, RoomService, RoomWatch, RosterInvariant, SecretWritable, TransitionContract,
    TurnStateInvariant,
};
