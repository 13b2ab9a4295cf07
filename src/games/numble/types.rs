//! Core domain types for Numble.

use super::rules::{ValidationError, validate};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of digits in a secret or guess.
pub const CODE_LEN: usize = 4;

/// A well-formed code: four distinct digits, each 1-9.
///
/// Only [`validate`] constructs a `Code`, so holding one proves the rules
/// were checked. Serialises as its 4-character string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Code {
    digits: [u8; CODE_LEN],
}

impl Code {
    pub(super) fn from_validated(digits: [u8; CODE_LEN]) -> Self {
        Self { digits }
    }

    /// Returns the digits in slot order.
    pub fn digits(&self) -> [u8; CODE_LEN] {
        self.digits
    }

    /// Returns true if `digit` occurs anywhere in the code.
    pub fn contains(&self, digit: u8) -> bool {
        self.digits.contains(&digit)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for d in self.digits {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

impl FromStr for Code {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl TryFrom<String> for Code {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate(&s)
    }
}

impl TryFrom<&str> for Code {
    type Error = ValidationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        validate(s)
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.to_string()
    }
}

/// Result of scoring one guess.
///
/// Always satisfies `position_count <= match_count <= 4`; decoding goes
/// through [`Feedback::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase", try_from = "FeedbackCounts")]
pub struct Feedback {
    /// Guess digits present anywhere in the secret.
    match_count: u8,
    /// Guess digits in their exact slot.
    position_count: u8,
}

/// Counts that cannot come from scoring two codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("impossible feedback: match {} / position {}", match_count, position_count)]
pub struct InvalidFeedback {
    /// Offending match count.
    pub match_count: u8,
    /// Offending position count.
    pub position_count: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackCounts {
    match_count: u8,
    position_count: u8,
}

impl TryFrom<FeedbackCounts> for Feedback {
    type Error = InvalidFeedback;

    fn try_from(raw: FeedbackCounts) -> Result<Self, Self::Error> {
        Self::try_new(raw.match_count, raw.position_count)
    }
}

impl Feedback {
    /// Creates feedback from counts produced by scoring.
    pub(crate) fn new(match_count: u8, position_count: u8) -> Self {
        debug_assert!(position_count <= match_count && match_count as usize <= CODE_LEN);
        Self {
            match_count,
            position_count,
        }
    }

    /// Creates feedback from raw counts, rejecting impossible ones.
    pub fn try_new(match_count: u8, position_count: u8) -> Result<Self, InvalidFeedback> {
        if position_count > match_count || match_count as usize > CODE_LEN {
            return Err(InvalidFeedback {
                match_count,
                position_count,
            });
        }
        Ok(Self {
            match_count,
            position_count,
        })
    }

    /// True when every digit is in place.
    pub fn is_win(&self) -> bool {
        self.position_count as usize == CODE_LEN
    }
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "match {} / position {}", self.match_count, self.position_count)
    }
}
