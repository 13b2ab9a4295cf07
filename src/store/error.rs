//! Store error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Broad category of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StoreErrorKind {
    /// The store could not be reached. Callers may retry.
    #[display("unavailable")]
    Unavailable,
    /// A document already exists where one was being created.
    #[display("already exists")]
    AlreadyExists,
    /// A path was empty or contained a forbidden character.
    #[display("invalid path")]
    InvalidPath,
    /// A value could not be converted to or from JSON.
    #[display("serialization")]
    Serialization,
}

/// Store error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Store error ({}): {} at {}:{}", kind, message, file, line)]
pub struct StoreError {
    /// Category of the failure.
    pub kind: StoreErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StoreError {
    /// Creates a new store error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for an [`StoreErrorKind::Unavailable`] error.
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    /// Shorthand for an [`StoreErrorKind::InvalidPath`] error.
    #[track_caller]
    pub fn invalid_path(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::InvalidPath, message)
    }

    /// True if retrying the same call could succeed.
    pub fn is_transient(&self) -> bool {
        self.kind == StoreErrorKind::Unavailable
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(StoreErrorKind::Serialization, format!("JSON error: {}", err))
    }
}
