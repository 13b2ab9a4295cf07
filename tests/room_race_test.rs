//! Rooms under interleaved writes from two players, and the reaper's
//! handling of damaged or undeletable documents.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use numble::transitions::{LeavePlan, plan_leave, plan_set_secret, plan_start};
use numble::{
    Code, ErrorKind, MemoryStore, NumbleConfig, Patch, PlayerSession, RoomService, RoomStatus,
    RoomStore, StoreError, Subscription,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Store that lands queued "other player" patches just before each
/// `update_fields`, and refuses to delete chosen paths.
#[derive(Default)]
struct InterleavingStore {
    inner: MemoryStore,
    before_update: Mutex<VecDeque<Patch>>,
    failing_deletes: Mutex<Vec<String>>,
}

impl InterleavingStore {
    fn queue(&self, patch: Patch) {
        self.before_update.lock().expect("lock").push_back(patch);
    }

    fn fail_delete(&self, path: String) {
        self.failing_deletes.lock().expect("lock").push(path);
    }
}

#[async_trait]
impl RoomStore for InterleavingStore {
    async fn create_document(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.inner.create_document(path, value).await
    }

    async fn read_document(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.inner.read_document(path).await
    }

    async fn update_fields(&self, path: &str, patch: &Patch) -> Result<(), StoreError> {
        let pending = self.before_update.lock().expect("lock").pop_front();
        if let Some(other) = pending {
            self.inner.update_fields(path, &other).await?;
        }
        self.inner.update_fields(path, patch).await
    }

    async fn delete_document(&self, path: &str) -> Result<(), StoreError> {
        let refused = self
            .failing_deletes
            .lock()
            .expect("lock")
            .iter()
            .any(|p| p == path);
        if refused {
            return Err(StoreError::unavailable(format!("cannot delete {}", path)));
        }
        self.inner.delete_document(path).await
    }

    async fn append_to_collection(&self, path: &str) -> Result<String, StoreError> {
        self.inner.append_to_collection(path).await
    }

    async fn subscribe(&self, path: &str) -> Result<Subscription, StoreError> {
        self.inner.subscribe(path).await
    }
}

fn code(s: &str) -> Code {
    s.parse().expect("valid code")
}

fn room_path<S: RoomStore>(service: &RoomService<S>, session: &PlayerSession) -> String {
    format!("{}/{}", service.config().rooms_root(), session.room_code())
}

async fn seated<S: RoomStore>(service: &RoomService<S>) -> (PlayerSession, PlayerSession) {
    let host = service.create_room("Ada").await.expect("create");
    let guest = service
        .join_room(host.room_code(), "Grace")
        .await
        .expect("join");
    (host, guest)
}

#[tokio::test]
async fn test_opponent_secret_landing_after_read_starts_game() {
    let service = RoomService::new(InterleavingStore::default(), NumbleConfig::default());
    let (host, guest) = seated(&service).await;

    let before = service.get_room(host.room_code()).await.expect("read").expect("room");
    let guest_secret =
        plan_set_secret(&before, guest.player_id(), code("5678"), Utc::now()).expect("guest plan");
    service.store().queue(guest_secret);

    let status = service.set_secret(&host, "1234").await.expect("host secret");
    assert_eq!(status, RoomStatus::Playing);

    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    assert_eq!(*room.status(), RoomStatus::Playing);
    assert_eq!(room.current_turn_player_id().as_ref(), Some(host.player_id()));
    assert!(room.both_ready());
}

#[tokio::test]
async fn test_concurrent_start_is_harmless() {
    let service = RoomService::new(InterleavingStore::default(), NumbleConfig::default());
    let (host, guest) = seated(&service).await;

    let before = service.get_room(host.room_code()).await.expect("read").expect("room");
    let now = Utc::now();
    let guest_secret =
        plan_set_secret(&before, guest.player_id(), code("5678"), now).expect("guest plan");
    let host_secret =
        plan_set_secret(&before, host.player_id(), code("1234"), now).expect("host plan");
    let both_ready = before
        .apply(&guest_secret)
        .expect("apply")
        .apply(&host_secret)
        .expect("apply");
    let guest_start = plan_start(&both_ready, now)
        .expect("start plan")
        .expect("both ready");

    // Guest's secret lands before our secret, guest's start before ours.
    service.store().queue(guest_secret);
    service.store().queue(guest_start);

    let status = service.set_secret(&host, "1234").await.expect("host secret");
    assert_eq!(status, RoomStatus::Playing);

    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    assert_eq!(*room.status(), RoomStatus::Playing);
    assert_eq!(room.current_turn_player_id().as_ref(), Some(host.player_id()));
}

#[tokio::test]
async fn test_simultaneous_leaves_leave_a_reapable_room() {
    let config = NumbleConfig::default().with_room_ttl_secs(60);
    let service = RoomService::new(MemoryStore::new(), config);
    let (host, guest) = seated(&service).await;
    service.set_secret(&host, "1234").await.expect("host secret");
    service.set_secret(&guest, "5678").await.expect("guest secret");
    service.submit_guess(&host, "5678").await.expect("winning guess");

    let snapshot = service.get_room(host.room_code()).await.expect("read").expect("room");
    let now = Utc::now();
    let LeavePlan::Update(guest_leaves) =
        plan_leave(&snapshot, guest.player_id(), now).expect("guest leave")
    else {
        panic!("expected update");
    };
    let LeavePlan::Update(host_leaves) =
        plan_leave(&snapshot, host.player_id(), now).expect("host leave")
    else {
        panic!("expected update");
    };

    let path = room_path(&service, &host);
    service.store().update_fields(&path, &guest_leaves).await.expect("guest write");
    service.store().update_fields(&path, &host_leaves).await.expect("host write");

    let room = service
        .get_room(host.room_code())
        .await
        .expect("room still decodes")
        .expect("room");
    assert_eq!(room.players().len(), 1);
    assert!(room.host().is_some());

    let reaped = service
        .reap_expired(now + Duration::seconds(61))
        .await
        .expect("reap");
    assert_eq!(reaped, vec![host.room_code().clone()]);
    assert!(service.get_room(host.room_code()).await.expect("read").is_none());
}

#[tokio::test]
async fn test_reaper_removes_undecodable_rooms() {
    let config = NumbleConfig::default().with_room_ttl_secs(60);
    let service = RoomService::new(MemoryStore::new(), config);
    let now = Utc::now();
    let stale = (now - Duration::seconds(120)).timestamp_millis();
    let fresh = now.timestamp_millis();

    let store = service.store();
    store
        .create_document("rooms/ABCD-1234", json!({"players": {"p": {"isHost": true}}, "lastActivityAt": stale}))
        .await
        .expect("stale stub");
    store
        .create_document("rooms/WXYZ-9999", json!({"players": {"p": {"isHost": true}}}))
        .await
        .expect("stub without activity");
    store
        .create_document("rooms/KLMN-5555", json!({"players": {"p": {"isHost": true}}, "lastActivityAt": fresh}))
        .await
        .expect("fresh stub");

    let mut reaped: Vec<String> = service
        .reap_expired(now)
        .await
        .expect("reap")
        .iter()
        .map(ToString::to_string)
        .collect();
    reaped.sort();
    assert_eq!(reaped, vec!["ABCD-1234", "WXYZ-9999"]);
    assert!(store.read_document("rooms/KLMN-5555").await.expect("read").is_some());
}

#[tokio::test]
async fn test_reaper_keeps_going_past_failed_delete() {
    let config = NumbleConfig::default().with_room_ttl_secs(60);
    let service = RoomService::new(InterleavingStore::default(), config);
    let stuck = service.create_room("Ada").await.expect("create");
    let idle = service.create_room("Grace").await.expect("create");
    service.store().fail_delete(room_path(&service, &stuck));

    let later = Utc::now() + Duration::seconds(61);
    let reaped = service.reap_expired(later).await.expect("partial reap");
    assert_eq!(reaped, vec![idle.room_code().clone()]);
    assert!(service.get_room(stuck.room_code()).await.expect("read").is_some());

    let err = service.reap_expired(later).await.expect_err("nothing reapable");
    assert_eq!(err.kind(), ErrorKind::TransientStoreError);
}
