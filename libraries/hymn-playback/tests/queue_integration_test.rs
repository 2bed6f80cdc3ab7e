//! Queue management through the session
//!
//! Enqueue positions, shuffle, reordering and clearing as seen by a UI:
//! queue snapshots, context position and emitted events.

mod common;

use common::{fire, session};
use hymn_playback::test_utils::{hymn, hymns};
use hymn_playback::{
    BackendEvent, ContextRequest, ContextType, Direction, EnqueuePosition, PlaybackError,
    PlaybackEvent, PlaybackStatus, RepeatMode,
};

fn queue_ids(session: &hymn_playback::PlaybackSession) -> Vec<String> {
    session
        .snapshot()
        .queue
        .into_iter()
        .map(|entry| entry.track.id.to_string())
        .collect()
}

// ===== Enqueue =====

#[test]
fn test_enqueue_emits_queue_length() {
    let (mut session, _element) = session();

    session.enqueue(hymn("a"), EnqueuePosition::End).unwrap();
    session.enqueue(hymn("b"), EnqueuePosition::End).unwrap();

    assert_eq!(
        session.drain_events(),
        vec![
            PlaybackEvent::QueueChanged { length: 1 },
            PlaybackEvent::QueueChanged { length: 2 },
        ]
    );
    assert_eq!(session.state().status, PlaybackStatus::Idle);
}

#[test]
fn test_enqueue_next_plays_after_current() {
    let (mut session, _element) = session();
    for track in hymns(&["a", "b", "c"]) {
        session.enqueue(track, EnqueuePosition::End).unwrap();
    }
    session.skip(Direction::Next);

    session.enqueue(hymn("urgent"), EnqueuePosition::Next).unwrap();
    assert_eq!(queue_ids(&session), vec!["a", "urgent", "b", "c"]);

    session.skip(Direction::Next);
    assert_eq!(session.state().current_track.as_ref().unwrap().id, "urgent");
}

#[test]
fn test_enqueue_next_without_current_goes_first() {
    let (mut session, _element) = session();
    session.enqueue(hymn("a"), EnqueuePosition::End).unwrap();
    session.enqueue(hymn("first"), EnqueuePosition::Next).unwrap();

    assert_eq!(queue_ids(&session), vec!["first", "a"]);
}

#[test]
fn test_enqueue_while_collection_plays_does_not_interrupt() {
    let (mut session, element) = session();
    let request = ContextRequest::collection(ContextType::Playlist, "pl-1", hymns(&["x", "y"]), 0);
    let start = session.set_playback_context(request).unwrap().unwrap();
    session.play_track(start).unwrap();
    fire(&mut session, &element, BackendEvent::CanPlay);

    session.enqueue(hymn("q"), EnqueuePosition::End).unwrap();

    assert_eq!(session.state().current_track.as_ref().unwrap().id, "x");
    assert_eq!(session.context().context_type, ContextType::Playlist);

    fire(&mut session, &element, BackendEvent::Ended);
    assert_eq!(session.state().current_track.as_ref().unwrap().id, "y");
}

// ===== Shuffle =====

#[test]
fn test_shuffle_keeps_playing_entry_first() {
    let (mut session, _element) = session();
    let ids: Vec<String> = (0..20).map(|i| format!("t{}", i)).collect();
    for id in &ids {
        session.enqueue(hymn(id), EnqueuePosition::End).unwrap();
    }
    for _ in 0..5 {
        session.skip(Direction::Next);
    }

    session.set_shuffle(true);

    let shuffled = queue_ids(&session);
    assert!(session.is_shuffled());
    assert_eq!(shuffled[0], "t4");
    // Positions index the unshuffled sequence
    assert_eq!(session.context().position_index, Some(4));
    let mut sorted = shuffled.clone();
    sorted.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(sorted, expected);

    session.set_shuffle(false);
    assert_eq!(queue_ids(&session), ids);
    assert_eq!(session.context().position_index, Some(4));
}

#[test]
fn test_shuffled_queue_plays_every_entry_once() {
    let (mut session, element) = session();
    for track in hymns(&["a", "b", "c", "d", "e"]) {
        session.enqueue(track, EnqueuePosition::End).unwrap();
    }
    session.set_shuffle(true);
    let order = queue_ids(&session);

    session.skip(Direction::Next);
    let mut played = vec![session.state().current_track.as_ref().unwrap().id.to_string()];
    while session.state().status != PlaybackStatus::Ended {
        fire(&mut session, &element, BackendEvent::Ended);
        if session.state().status != PlaybackStatus::Ended {
            played.push(session.state().current_track.as_ref().unwrap().id.to_string());
        }
    }

    assert_eq!(played, order);
}

// ===== Reorder & clear =====

#[test]
fn test_reorder_follows_playing_entry() {
    let (mut session, _element) = session();
    for track in hymns(&["a", "b", "c", "d"]) {
        session.enqueue(track, EnqueuePosition::End).unwrap();
    }
    session.skip(Direction::Next);
    session.skip(Direction::Next);

    session.reorder_queue(1, 3).unwrap();

    assert_eq!(queue_ids(&session), vec!["a", "c", "d", "b"]);
    assert_eq!(session.context().position_index, Some(3));
    assert_eq!(session.state().current_track.as_ref().unwrap().id, "b");
}

#[test]
fn test_reorder_out_of_bounds() {
    let (mut session, _element) = session();
    session.enqueue(hymn("a"), EnqueuePosition::End).unwrap();

    assert!(matches!(
        session.reorder_queue(0, 5),
        Err(PlaybackError::QueueInvariant(_))
    ));
}

#[test]
fn test_clear_queue_keeps_playing_track_audible() {
    let (mut session, element) = session();
    for track in hymns(&["a", "b"]) {
        session.enqueue(track, EnqueuePosition::End).unwrap();
    }
    session.skip(Direction::Next);
    fire(&mut session, &element, BackendEvent::CanPlay);

    session.clear_queue();

    assert!(session.queue().is_empty());
    assert_eq!(session.state().status, PlaybackStatus::Playing);
    assert_eq!(session.context().position_index, None);

    // Nothing left to advance to
    fire(&mut session, &element, BackendEvent::Ended);
    assert_eq!(session.state().status, PlaybackStatus::Ended);
}

#[test]
fn test_replacing_queue_through_context() {
    let (mut session, _element) = session();
    session.enqueue(hymn("old"), EnqueuePosition::End).unwrap();

    let request = ContextRequest {
        tracks: hymns(&["n1", "n2", "n3"]),
        start_index: 2,
        ..ContextRequest::queue()
    };
    let start = session.set_playback_context(request).unwrap();

    assert_eq!(start.unwrap().id, "n3");
    assert_eq!(queue_ids(&session), vec!["n1", "n2", "n3"]);
    assert_eq!(session.context().position_index, Some(2));
}

#[test]
fn test_repeat_all_wraps_queue() {
    let (mut session, element) = session();
    session.set_repeat(RepeatMode::All);
    for track in hymns(&["a", "b"]) {
        session.enqueue(track, EnqueuePosition::End).unwrap();
    }
    session.skip(Direction::Next);
    fire(&mut session, &element, BackendEvent::Ended);
    fire(&mut session, &element, BackendEvent::Ended);

    assert_eq!(session.state().current_track.as_ref().unwrap().id, "a");
    assert_eq!(session.state().status, PlaybackStatus::Loading);
}
