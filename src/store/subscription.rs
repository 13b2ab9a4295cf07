//! Long-lived watches on a document path.

use super::DocPath;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

/// Full value at a watched path after a change. `value` is `None` once the
/// document no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Watched path.
    pub path: DocPath,
    /// Current value at the path.
    pub value: Option<Value>,
}

type Cancel = Box<dyn FnOnce() + Send + 'static>;

/// Receiving end of a watch.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// deregisters it from the store.
pub struct Subscription {
    path: DocPath,
    rx: mpsc::UnboundedReceiver<Snapshot>,
    cancel: Option<Cancel>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

impl Subscription {
    /// Wraps a receiver and the store-side cleanup to run on release.
    pub fn new(
        path: DocPath,
        rx: mpsc::UnboundedReceiver<Snapshot>,
        cancel: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            path,
            rx,
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Watched path.
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    /// Waits for the next snapshot. Returns `None` once the store has
    /// dropped the sending side.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Returns a snapshot that is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        self.rx.try_recv().ok()
    }

    /// Releases the watch.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            debug!(path = %self.path, "Releasing subscription");
            cancel();
            self.rx.close();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
