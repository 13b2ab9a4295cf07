//! Realtime document store used to share room state between players.
//!
//! The store is a JSON tree addressed by `/`-separated paths. Writers push
//! [`Patch`]es; readers either fetch a document once or hold a
//! [`Subscription`] that receives the full value at its path after every
//! change.

mod error;
mod memory;
mod patch;
mod subscription;
mod traits;

pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryStore;
pub use patch::{DocPath, Patch};
pub use subscription::{Snapshot, Subscription};
pub use traits::RoomStore;
