//! Runtime configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding [`NumbleConfig::room_ttl_secs`].
pub const ROOM_TTL_ENV: &str = "NUMBLE_ROOM_TTL_SECS";

/// Settings for the room service.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct NumbleConfig {
    /// Store path under which rooms live.
    #[serde(default = "default_rooms_root")]
    rooms_root: String,

    /// Seconds a room may sit idle before the reaper deletes it.
    #[serde(default = "default_room_ttl_secs")]
    room_ttl_secs: u64,

    /// Longest accepted player name, in characters.
    #[serde(default = "default_max_name_len")]
    max_name_len: usize,

    /// Fresh room codes tried before giving up on a create.
    #[serde(default = "default_code_attempts")]
    code_attempts: u32,
}

#[instrument]
fn default_rooms_root() -> String {
    "rooms".to_string()
}

#[instrument]
fn default_room_ttl_secs() -> u64 {
    24 * 60 * 60
}

#[instrument]
fn default_max_name_len() -> usize {
    24
}

#[instrument]
fn default_code_attempts() -> u32 {
    8
}

impl Default for NumbleConfig {
    fn default() -> Self {
        Self {
            rooms_root: default_rooms_root(),
            room_ttl_secs: default_room_ttl_secs(),
            max_name_len: default_max_name_len(),
            code_attempts: default_code_attempts(),
        }
    }
}

impl NumbleConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.check()?;
        info!(rooms_root = %config.rooms_root, ttl = config.room_ttl_secs, "Config loaded");
        Ok(config)
    }

    /// Applies overrides from the environment.
    #[instrument(skip(self))]
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(raw) = std::env::var(ROOM_TTL_ENV) {
            self.room_ttl_secs = raw.trim().parse().map_err(|e| {
                warn!(%raw, "Bad TTL override");
                ConfigError::new(format!("{} must be a number of seconds: {}", ROOM_TTL_ENV, e))
            })?;
            debug!(ttl = self.room_ttl_secs, "TTL overridden from environment");
        }
        self.check()?;
        Ok(self)
    }

    /// Sets the idle TTL.
    pub fn with_room_ttl_secs(mut self, secs: u64) -> Self {
        self.room_ttl_secs = secs;
        self
    }

    /// Idle TTL as a duration.
    pub fn room_ttl(&self) -> chrono::Duration {
        i64::try_from(self.room_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.rooms_root.trim_matches('/').is_empty() {
            return Err(ConfigError::new("rooms_root must not be empty"));
        }
        if self.max_name_len == 0 {
            return Err(ConfigError::new("max_name_len must be at least 1"));
        }
        if self.code_attempts == 0 {
            return Err(ConfigError::new("code_attempts must be at least 1"));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
