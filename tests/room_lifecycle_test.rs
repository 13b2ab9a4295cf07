//! Room lifecycle through the service, end to end on the in-memory store.

use chrono::{Duration, Utc};
use numble::{
    Conflict, ErrorKind, Feedback, MemoryStore, Missing, NumbleConfig, PlayerSession, RoomCode,
    RoomError, RoomService, RoomStatus, ValidationError,
};

fn feedback(match_count: u8, position_count: u8) -> Feedback {
    Feedback::try_new(match_count, position_count).expect("possible feedback")
}

fn service() -> RoomService<MemoryStore> {
    RoomService::new(MemoryStore::new(), NumbleConfig::default())
}

async fn ready_room(service: &RoomService<MemoryStore>) -> (PlayerSession, PlayerSession) {
    let host = service.create_room("Ada").await.expect("create");
    let guest = service
        .join_room(host.room_code(), "Grace")
        .await
        .expect("join");
    (host, guest)
}

async fn playing_room(service: &RoomService<MemoryStore>) -> (PlayerSession, PlayerSession) {
    let (host, guest) = ready_room(service).await;
    service.set_secret(&host, "1234").await.expect("host secret");
    let status = service.set_secret(&guest, "5678").await.expect("guest secret");
    assert_eq!(status, RoomStatus::Playing);
    (host, guest)
}

#[tokio::test]
async fn test_host_wins_on_first_guess() {
    let service = service();
    let host = service.create_room("Ada").await.expect("create");

    let room = service
        .get_room(host.room_code())
        .await
        .expect("read")
        .expect("room exists");
    assert_eq!(*room.status(), RoomStatus::Waiting);
    assert_eq!(room.players().len(), 1);
    assert!(room.host().is_some_and(|p| p.id() == host.player_id()));

    let guest = service
        .join_room(host.room_code(), "Grace")
        .await
        .expect("join");
    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    assert_eq!(*room.status(), RoomStatus::Ready);

    let status = service.set_secret(&host, "1234").await.expect("host secret");
    assert_eq!(status, RoomStatus::Ready);
    let status = service.set_secret(&guest, "5678").await.expect("guest secret");
    assert_eq!(status, RoomStatus::Playing);

    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    assert_eq!(room.current_turn_player_id().as_ref(), Some(host.player_id()));

    let outcome = service.submit_guess(&host, "5678").await.expect("guess");
    assert_eq!(*outcome.feedback(), feedback(4, 4));
    assert!(*outcome.won());

    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    assert_eq!(*room.status(), RoomStatus::Finished);
    assert_eq!(room.winner_player_id().as_ref(), Some(host.player_id()));
    assert!(room.current_turn_player_id().is_none());
    assert_eq!(room.guess_history().count(), 1);
    assert_eq!(*room.player(host.player_id()).expect("host").guess_count(), 1);
}

#[tokio::test]
async fn test_turns_alternate() {
    let service = service();
    let (host, guest) = playing_room(&service).await;

    let outcome = service.submit_guess(&host, "5687").await.expect("host guess");
    assert_eq!(*outcome.feedback(), feedback(4, 2));
    assert!(!*outcome.won());

    let err = service
        .submit_guess(&host, "5678")
        .await
        .expect_err("host guessed twice");
    assert!(matches!(err, RoomError::Conflict(Conflict::NotYourTurn)));

    let outcome = service.submit_guess(&guest, "4321").await.expect("guest guess");
    assert_eq!(*outcome.feedback(), feedback(4, 0));

    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    let history: Vec<_> = room.guess_history().map(|g| g.player_id().clone()).collect();
    assert_eq!(history, vec![host.player_id().clone(), guest.player_id().clone()]);
    assert!(room.is_players_turn(host.player_id()));
}

#[tokio::test]
async fn test_join_rejected_once_ready() {
    let service = service();
    let (host, _guest) = ready_room(&service).await;
    let before = service.get_room(host.room_code()).await.expect("read");

    let err = service
        .join_room(host.room_code(), "Eve")
        .await
        .expect_err("third player");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let after = service.get_room(host.room_code()).await.expect("read");
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_join_rejected_while_playing_and_finished() {
    let service = service();
    let (host, _guest) = playing_room(&service).await;

    let err = service.join_room(host.room_code(), "Eve").await.expect_err("playing");
    assert!(matches!(err, RoomError::Conflict(Conflict::GameAlreadyStarted)));

    service.submit_guess(&host, "5678").await.expect("winning guess");
    let err = service.join_room(host.room_code(), "Eve").await.expect_err("finished");
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_join_missing_room() {
    let service = service();
    let code = RoomCode::parse("ZZZZ-0000").expect("code");
    let err = service.join_room(&code, "Eve").await.expect_err("missing");
    assert!(matches!(&err, RoomError::NotFound(Missing::Room(c)) if *c == code));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_names_are_validated() {
    let service = service();
    let err = service.create_room("   ").await.expect_err("empty name");
    assert!(matches!(err, RoomError::Validation(ValidationError::EmptyName)));

    let long = "x".repeat(*service.config().max_name_len() + 1);
    let err = service.create_room(&long).await.expect_err("long name");
    assert_eq!(err.kind(), ErrorKind::ValidationError);
}

#[tokio::test]
async fn test_secret_is_write_once() {
    let service = service();
    let (host, _guest) = ready_room(&service).await;

    service.set_secret(&host, "1234").await.expect("first");
    let err = service.set_secret(&host, "9876").await.expect_err("second");
    assert!(matches!(err, RoomError::Conflict(Conflict::SecretAlreadySet)));

    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    let secret = room.player(host.player_id()).expect("host").secret().expect("secret");
    assert_eq!(secret.to_string(), "1234");
}

#[tokio::test]
async fn test_secret_rejected_after_start() {
    let service = service();
    let (host, _guest) = playing_room(&service).await;
    let err = service.set_secret(&host, "9876").await.expect_err("playing");
    assert!(matches!(err, RoomError::Conflict(Conflict::GameAlreadyStarted)));
}

#[tokio::test]
async fn test_invalid_codes_rejected() {
    let service = service();
    let (host, guest) = ready_room(&service).await;

    let err = service.set_secret(&host, "0123").await.expect_err("zero");
    assert!(matches!(err, RoomError::Validation(ValidationError::DigitOutOfRange)));

    service.set_secret(&host, "1234").await.expect("host secret");
    service.set_secret(&guest, "5678").await.expect("guest secret");
    let err = service.submit_guess(&host, "1123").await.expect_err("duplicate");
    assert!(matches!(err, RoomError::Validation(ValidationError::DuplicateDigit)));
}

#[tokio::test]
async fn test_guess_before_playing() {
    let service = service();
    let (host, _guest) = ready_room(&service).await;
    let err = service.submit_guess(&host, "5678").await.expect_err("ready");
    assert!(matches!(
        err,
        RoomError::Conflict(Conflict::NotPlaying(RoomStatus::Ready))
    ));
}

#[tokio::test]
async fn test_unknown_player_rejected() {
    let service = service();
    let (host, _guest) = playing_room(&service).await;
    let stranger = PlayerSession::new(host.room_code().clone(), "player_stranger".into());
    let err = service.submit_guess(&stranger, "5678").await.expect_err("stranger");
    assert!(matches!(err, RoomError::NotFound(Missing::Player(_))));
}

#[tokio::test]
async fn test_last_player_leaving_deletes_room() {
    let service = service();
    let host = service.create_room("Ada").await.expect("create");
    service.leave_room(&host).await.expect("leave");
    assert!(service.get_room(host.room_code()).await.expect("read").is_none());

    // Leaving twice is harmless.
    service.leave_room(&host).await.expect("leave again");
}

#[tokio::test]
async fn test_leaving_mid_game_forfeits() {
    let service = service();
    let (host, guest) = playing_room(&service).await;

    service.leave_room(&host).await.expect("host leaves");
    let room = service.get_room(host.room_code()).await.expect("read").expect("room");
    assert_eq!(*room.status(), RoomStatus::Finished);
    assert_eq!(room.winner_player_id().as_ref(), Some(guest.player_id()));
    assert!(room.player(host.player_id()).is_none());
    assert!(*room.player(guest.player_id()).expect("guest").is_host());

    service.leave_room(&guest).await.expect("guest leaves");
    assert!(service.get_room(host.room_code()).await.expect("read").is_none());
}

#[tokio::test]
async fn test_offline_store_is_transient() {
    let service = service();
    let host = service.create_room("Ada").await.expect("create");

    service.store().set_offline(true);
    let err = service.join_room(host.room_code(), "Grace").await.expect_err("offline");
    assert!(err.is_transient());
    assert_eq!(err.kind(), ErrorKind::TransientStoreError);

    service.store().set_offline(false);
    service.join_room(host.room_code(), "Grace").await.expect("back online");
}

#[tokio::test]
async fn test_reaper_removes_idle_rooms() {
    let store = MemoryStore::new();
    let config = NumbleConfig::default().with_room_ttl_secs(60);
    let service = RoomService::new(store, config);

    let idle = service.create_room("Ada").await.expect("create");
    let now = Utc::now();

    let reaped = service.reap_expired(now).await.expect("reap");
    assert!(reaped.is_empty());

    let reaped = service
        .reap_expired(now + Duration::seconds(61))
        .await
        .expect("reap");
    assert_eq!(reaped, vec![idle.room_code().clone()]);
    assert!(service.get_room(idle.room_code()).await.expect("read").is_none());
}

#[tokio::test]
async fn test_reaper_on_empty_store() {
    let service = service();
    let reaped = service.reap_expired(Utc::now()).await.expect("reap");
    assert!(reaped.is_empty());
}
