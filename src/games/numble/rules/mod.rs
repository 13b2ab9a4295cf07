//! Rule modules for Numble.
//!
//! Validation guards every code that enters the game; scoring compares a
//! guess with the opponent's secret.

mod score;
mod validate;

pub use score::{score, score_str};
pub use validate::{validate, ValidationError};
