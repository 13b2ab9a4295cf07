//! Room change notifications.

use super::{Room, RoomCode};
use crate::store::Subscription;
use tracing::{debug, instrument, warn};

/// A change to a watched room. Every update carries the full room.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// Current state of the room.
    Updated(Room),
    /// The room no longer exists.
    Deleted,
}

/// Stream of [`RoomEvent`]s for one room.
///
/// The first event is the state at the time of subscribing. Dropping the
/// watch (or calling [`RoomWatch::close`]) releases the underlying
/// subscription.
#[derive(Debug)]
pub struct RoomWatch {
    code: RoomCode,
    subscription: Subscription,
}

impl RoomWatch {
    pub(super) fn new(code: RoomCode, subscription: Subscription) -> Self {
        Self { code, subscription }
    }

    /// Watched room code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Waits for the next event. Snapshots that do not decode as a room are
    /// logged and skipped. Returns `None` once the store stops delivering.
    #[instrument(skip(self), fields(code = %self.code))]
    pub async fn next(&mut self) -> Option<RoomEvent> {
        loop {
            let snapshot = self.subscription.next().await?;
            let Some(value) = snapshot.value else {
                debug!("Room deleted");
                return Some(RoomEvent::Deleted);
            };
            match Room::from_value(value) {
                Ok(room) => {
                    debug!(status = %room.status(), "Room updated");
                    return Some(RoomEvent::Updated(room));
                }
                Err(e) => warn!(error = %e, "Skipping undecodable room snapshot"),
            }
        }
    }

    /// Releases the watch.
    #[instrument(skip(self), fields(code = %self.code))]
    pub fn close(self) {
        self.subscription.unsubscribe();
    }
}
