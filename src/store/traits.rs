//! Store trait.

use super::{Patch, StoreError, Subscription};
use async_trait::async_trait;
use serde_json::Value;

/// A realtime JSON document store with subscribe/update semantics.
///
/// Paths are `/`-separated. Every mutating call is all-or-nothing: it either
/// applies completely or returns an error and changes nothing.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// Writes a new document. Fails with
    /// [`StoreErrorKind::AlreadyExists`](super::StoreErrorKind::AlreadyExists)
    /// if one is already present.
    async fn create_document(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Reads the document at `path`, or `None` if absent.
    async fn read_document(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Applies every write in `patch`, relative to `path`, atomically.
    async fn update_fields(&self, path: &str, patch: &Patch) -> Result<(), StoreError>;

    /// Removes the document and everything under it.
    async fn delete_document(&self, path: &str) -> Result<(), StoreError>;

    /// Reserves a fresh child key under the collection at `path` and returns
    /// the full child path. Keys sort in insertion order. Nothing is written.
    async fn append_to_collection(&self, path: &str) -> Result<String, StoreError>;

    /// Watches `path`. The current value is delivered first, then the full
    /// value after every change that touches the path.
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError>;
}
