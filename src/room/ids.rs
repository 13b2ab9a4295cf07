//! Room codes and player identifiers.

use crate::games::numble::ValidationError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Letters used in room codes. `I` and `O` are left out so codes read
/// unambiguously next to `1` and `0`.
pub const ROOM_CODE_LETTERS: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const PLAYER_ID_PREFIX: &str = "player_";
const PLAYER_ID_RANDOM_LEN: usize = 9;

/// Shareable room code such as `ABCD-1234`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Generates a random code.
    #[instrument]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let mut code = String::with_capacity(9);
        for _ in 0..4 {
            let i = rng.random_range(0..ROOM_CODE_LETTERS.len());
            code.push(ROOM_CODE_LETTERS[i] as char);
        }
        code.push('-');
        for _ in 0..4 {
            let d: u8 = rng.random_range(0..10);
            code.push((b'0' + d) as char);
        }
        Self(code)
    }

    /// Parses a code typed by a player. Lower case is accepted and
    /// normalised to upper case.
    #[instrument]
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let code = raw.trim().to_ascii_uppercase();
        let bytes = code.as_bytes();
        let well_formed = bytes.len() == 9
            && bytes[..4].iter().all(|b| ROOM_CODE_LETTERS.contains(b))
            && bytes[4] == b'-'
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if well_formed {
            Ok(Self(code))
        } else {
            Err(ValidationError::MalformedRoomCode)
        }
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

/// Opaque player identifier, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Generates `player_` followed by nine random base-36 characters.
    #[instrument]
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..PLAYER_ID_RANDOM_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}{}", PLAYER_ID_PREFIX, suffix))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
