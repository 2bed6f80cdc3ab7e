//! Session persistence tests (memory and JSON file stores)

mod common;

use chrono::{Duration, Utc};
use hymn_core::TrackId;
use hymn_playback::test_utils::{hymn, ElementCall, FakeMediaElement};
use hymn_playback::{
    BackendEvent, JsonFileStore, MemoryStore, PersistedSnapshot, PlaybackConfig, PlaybackSession,
    PlaybackStatus, RestorePoint,
};
use tempfile::TempDir;

fn saved_snapshot() -> PersistedSnapshot {
    PersistedSnapshot {
        last_track_id: Some(TrackId::new("h-7")),
        last_position_seconds: 42.0,
        volume: 0.3,
        is_muted: true,
    }
}

fn restored_session(store: MemoryStore) -> (PlaybackSession, FakeMediaElement) {
    common::init_tracing();
    let element = FakeMediaElement::new();
    let session = PlaybackSession::with_persistence(
        PlaybackConfig::default(),
        Box::new(element.clone()),
        Box::new(store),
    )
    .unwrap();
    (session, element)
}

// ===== Restore =====

#[test]
fn test_restore_applies_volume_without_playing() {
    let (session, element) = restored_session(MemoryStore::with_snapshot(saved_snapshot()));

    assert_eq!(session.state().volume, 0.3);
    assert!(session.state().is_muted);
    assert_eq!(session.state().status, PlaybackStatus::Idle);
    assert!(session.state().current_track.is_none());

    assert_eq!(element.load_count(), 0);
    let calls = element.calls();
    assert!(calls.contains(&ElementCall::SetVolume(0.3)));
    assert!(calls.contains(&ElementCall::SetMuted(true)));

    assert_eq!(
        session.restore_point(),
        Some(&RestorePoint {
            track_id: TrackId::new("h-7"),
            position_seconds: 42.0,
        })
    );
}

#[test]
fn test_missing_snapshot_uses_config_defaults() {
    let (session, _element) = restored_session(MemoryStore::new());

    assert_eq!(session.state().volume, 0.8);
    assert!(!session.state().is_muted);
    assert!(session.restore_point().is_none());
}

#[test]
fn test_resume_seeks_to_saved_position() {
    let (mut session, element) = restored_session(MemoryStore::with_snapshot(saved_snapshot()));

    session.resume(hymn("h-7")).unwrap();

    assert_eq!(session.state().current_track.as_ref().unwrap().id, "h-7");
    assert!(session.restore_point().is_none());
    assert_eq!(session.state().current_time_seconds, 0.0);

    // Position is applied once the load can play
    common::fire(&mut session, &element, BackendEvent::CanPlay);
    assert_eq!(session.state().status, PlaybackStatus::Playing);
    assert_eq!(session.state().current_time_seconds, 42.0);
    assert_eq!(element.current_time(), 42.0);
}

#[test]
fn test_resume_with_other_track_starts_from_beginning() {
    let (mut session, element) = restored_session(MemoryStore::with_snapshot(saved_snapshot()));

    session.resume(hymn("h-8")).unwrap();
    common::fire(&mut session, &element, BackendEvent::CanPlay);

    assert_eq!(session.state().current_time_seconds, 0.0);
    assert!(!element
        .calls()
        .iter()
        .any(|call| matches!(call, ElementCall::SetCurrentTime(_))));
}

// ===== Throttled writes =====

#[test]
fn test_changes_are_written_after_debounce() {
    let store = MemoryStore::new();
    let (mut session, _element) = restored_session(store.clone());

    session.set_volume(0.5);
    session.set_volume(0.6);
    session.tick(Utc::now());
    assert_eq!(store.save_count(), 0);

    session.tick(Utc::now() + Duration::seconds(2));
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.snapshot().unwrap().volume, 0.6);

    // Nothing changed since the last write
    session.tick(Utc::now() + Duration::seconds(10));
    assert_eq!(store.save_count(), 1);
}

#[test]
fn test_unchanged_snapshot_is_not_rewritten() {
    let store = MemoryStore::with_snapshot(saved_snapshot());
    let (mut session, _element) = restored_session(store.clone());

    // Same level and mute state as the stored snapshot
    session.set_volume(0.3);
    session.flush_persistence();

    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_position_is_persisted_with_track() {
    let store = MemoryStore::new();
    let (mut session, element) = restored_session(store.clone());

    session.play_track(hymn("h-1")).unwrap();
    common::fire(&mut session, &element, BackendEvent::CanPlay);
    common::fire(&mut session, &element, BackendEvent::TimeUpdate(64.5));
    session.flush_persistence();

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.last_track_id, Some(TrackId::new("h-1")));
    assert_eq!(snapshot.last_position_seconds, 64.5);
}

#[test]
fn test_restore_point_survives_until_something_plays() {
    let store = MemoryStore::with_snapshot(saved_snapshot());
    let (mut session, _element) = restored_session(store.clone());

    session.set_muted(false);
    session.flush_persistence();

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.last_track_id, Some(TrackId::new("h-7")));
    assert_eq!(snapshot.last_position_seconds, 42.0);
    assert!(!snapshot.is_muted);
}

#[test]
fn test_shutdown_flushes_pending_write() {
    let store = MemoryStore::new();
    let (mut session, element) = restored_session(store.clone());

    session.play_track(hymn("h-2")).unwrap();
    session.shutdown();

    assert_eq!(store.save_count(), 1);
    assert_eq!(store.snapshot().unwrap().last_track_id, Some(TrackId::new("h-2")));
    assert!(element.source().is_none());
}

#[test]
fn test_shutdown_without_changes_skips_write() {
    let store = MemoryStore::new();
    let (session, _element) = restored_session(store.clone());

    session.shutdown();

    assert_eq!(store.save_count(), 0);
}

// ===== JSON file store =====

#[test]
fn test_file_store_round_trip_across_sessions() {
    common::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("playback.json");

    let element = FakeMediaElement::new();
    let mut session = PlaybackSession::with_persistence(
        PlaybackConfig::default(),
        Box::new(element.clone()),
        Box::new(JsonFileStore::new(&path)),
    )
    .unwrap();
    session.play_track(hymn("h-3")).unwrap();
    common::fire(&mut session, &element, BackendEvent::TimeUpdate(30.0));
    session.set_volume(0.45);
    session.shutdown();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["lastTrackId"], "h-3");
    assert_eq!(json["lastPositionSeconds"], 30.0);

    let reopened = PlaybackSession::with_persistence(
        PlaybackConfig::default(),
        Box::new(FakeMediaElement::new()),
        Box::new(JsonFileStore::new(&path)),
    )
    .unwrap();
    assert_eq!(reopened.state().volume, 0.45);
    assert_eq!(
        reopened.restore_point().map(|p| p.track_id.as_str()),
        Some("h-3")
    );
}

#[test]
fn test_corrupt_file_starts_fresh() {
    common::init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playback.json");
    std::fs::write(&path, "{ not json").unwrap();

    let session = PlaybackSession::with_persistence(
        PlaybackConfig::default(),
        Box::new(FakeMediaElement::new()),
        Box::new(JsonFileStore::new(&path)),
    )
    .unwrap();

    assert_eq!(session.state().volume, 0.8);
    assert!(session.restore_point().is_none());
}
