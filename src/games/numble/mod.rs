//! Numble: each player hides a 4-digit code and races to guess the other's.

mod phases;
mod rules;
mod types;

pub use phases::{RoomStatus, TransitionError};
pub use rules::{score, score_str, validate, ValidationError};
pub use types::{Code, Feedback, InvalidFeedback, CODE_LEN};
