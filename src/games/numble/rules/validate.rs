//! Code well-formedness rules.

use super::super::types::{CODE_LEN, Code};
use tracing::{instrument, warn};

/// Reason a code (or player name) was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ValidationError {
    /// The code does not have exactly four characters.
    #[display("wrong length")]
    WrongLength,

    /// A character is not one of the digits 1-9.
    #[display("digit out of range")]
    DigitOutOfRange,

    /// The same digit appears more than once.
    #[display("duplicate digit")]
    DuplicateDigit,

    /// A player name is empty or only whitespace.
    #[display("empty name")]
    EmptyName,

    /// A player name is longer than the configured limit.
    #[display("name longer than {} characters", _0)]
    NameTooLong(usize),

    /// A room code is not of the form `ABCD-1234`.
    #[display("malformed room code")]
    MalformedRoomCode,
}

impl std::error::Error for ValidationError {}

/// Validates a secret or guess.
///
/// Rules are checked in order and the first failure wins:
/// 1. exactly four characters,
/// 2. every character a digit 1-9,
/// 3. no digit repeated.
#[instrument]
pub fn validate(code: &str) -> Result<Code, ValidationError> {
    if code.chars().count() != CODE_LEN {
        warn!(len = code.chars().count(), "Rejected code");
        return Err(ValidationError::WrongLength);
    }

    let mut digits = [0u8; CODE_LEN];
    for (slot, c) in digits.iter_mut().zip(code.chars()) {
        match c {
            '1'..='9' => *slot = c as u8 - b'0',
            _ => {
                warn!(%c, "Rejected code");
                return Err(ValidationError::DigitOutOfRange);
            }
        }
    }

    for i in 0..CODE_LEN {
        if digits[i + 1..].contains(&digits[i]) {
            warn!(digit = digits[i], "Rejected code");
            return Err(ValidationError::DuplicateDigit);
        }
    }

    Ok(Code::from_validated(digits))
}
