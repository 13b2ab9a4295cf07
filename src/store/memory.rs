//! In-process store backed by a JSON tree.

use super::{DocPath, Patch, RoomStore, Snapshot, StoreError, StoreErrorKind, Subscription};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

#[derive(Debug)]
struct Watcher {
    id: u64,
    path: DocPath,
    tx: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Debug)]
struct Inner {
    root: Value,
    watchers: Vec<Watcher>,
    next_watcher: u64,
    last_key_millis: i64,
    key_seq: u32,
}

impl Inner {
    fn notify(&mut self, changed: &[DocPath]) {
        let root = &self.root;
        self.watchers.retain(|w| {
            if !changed.iter().any(|p| p.overlaps(&w.path)) {
                return true;
            }
            let snapshot = Snapshot {
                path: w.path.clone(),
                value: w.path.get(root).cloned(),
            };
            trace!(watcher = w.id, path = %w.path, "Delivering snapshot");
            w.tx.send(snapshot).is_ok()
        });
    }
}

/// Thread-safe in-memory [`RoomStore`].
///
/// Clones share the same tree, so two "clients" in a test or demo can hold
/// their own handle.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
    offline: Arc<AtomicBool>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory store");
        Self {
            inner: Arc::new(Mutex::new(Inner {
                root: Value::Object(Map::new()),
                watchers: Vec::new(),
                next_watcher: 0,
                last_key_millis: 0,
                key_seq: 0,
            })),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulates losing (or regaining) the connection. While offline every
    /// call fails with [`StoreErrorKind::Unavailable`].
    #[instrument(skip(self))]
    pub fn set_offline(&self, offline: bool) {
        warn!(offline, "Store connectivity changed");
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of live subscriptions.
    pub fn watcher_count(&self) -> usize {
        self.lock().map(|inner| inner.watchers.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("Store is offline"));
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::unavailable("Store lock poisoned"))
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    #[instrument(skip(self, value))]
    async fn create_document(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let path = DocPath::parse(path)?;
        let mut inner = self.lock()?;
        if path.get(&inner.root).is_some() {
            warn!(%path, "Document already exists");
            return Err(StoreError::new(
                StoreErrorKind::AlreadyExists,
                format!("Document '{}' already exists", path),
            ));
        }
        path.write(&mut inner.root, Some(value));
        if path.get(&inner.root).is_none() {
            warn!(%path, "Document is empty once nulls are dropped");
            return Err(StoreError::new(
                StoreErrorKind::Serialization,
                format!("Document '{}' has no non-null content", path),
            ));
        }
        inner.notify(std::slice::from_ref(&path));
        debug!(%path, "Document created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn read_document(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let path = DocPath::parse(path)?;
        let inner = self.lock()?;
        Ok(path.get(&inner.root).cloned())
    }

    #[instrument(skip(self, patch), fields(writes = patch.len()))]
    async fn update_fields(&self, path: &str, patch: &Patch) -> Result<(), StoreError> {
        let base = DocPath::parse(path)?;
        let writes = patch.resolve(&base)?;
        let mut inner = self.lock()?;
        let mut changed = Vec::with_capacity(writes.len());
        for (target, value) in writes {
            target.write(&mut inner.root, value);
            changed.push(target);
        }
        inner.notify(&changed);
        debug!(%base, "Fields updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, path: &str) -> Result<(), StoreError> {
        let path = DocPath::parse(path)?;
        let mut inner = self.lock()?;
        path.write(&mut inner.root, None);
        inner.notify(std::slice::from_ref(&path));
        debug!(%path, "Document deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn append_to_collection(&self, path: &str) -> Result<String, StoreError> {
        let path = DocPath::parse(path)?;
        let mut inner = self.lock()?;
        let now = Utc::now().timestamp_millis();
        if now > inner.last_key_millis {
            inner.last_key_millis = now;
            inner.key_seq = 0;
        } else {
            inner.key_seq += 1;
        }
        let key = format!("{:012x}{:06x}", inner.last_key_millis, inner.key_seq);
        let child = path.child(key)?;
        trace!(%child, "Reserved collection key");
        Ok(child.to_string())
    }

    #[instrument(skip(self))]
    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        let path = DocPath::parse(path)?;
        let mut inner = self.lock()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let initial = Snapshot {
            path: path.clone(),
            value: path.get(&inner.root).cloned(),
        };
        // Receiver is alive in this scope, so the send cannot fail.
        let _ = tx.send(initial);

        let id = inner.next_watcher;
        inner.next_watcher += 1;
        inner.watchers.push(Watcher {
            id,
            path: path.clone(),
            tx,
        });
        debug!(watcher = id, %path, "Subscribed");

        let registry = Arc::clone(&self.inner);
        Ok(Subscription::new(path, rx, move || {
            if let Ok(mut inner) = registry.lock() {
                inner.watchers.retain(|w| w.id != id);
            }
        }))
    }
}
