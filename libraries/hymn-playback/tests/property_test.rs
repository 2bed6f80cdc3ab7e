//! Property-based tests for queue and session
//!
//! Uses proptest to verify invariants across many random inputs.

mod common;

use hymn_core::TrackId;
use hymn_playback::test_utils::{hymn, FakeMediaElement};
use hymn_playback::{
    BackendEvent, Direction, EnqueuePosition, PlaybackConfig, PlaybackSession, PlaybackStatus,
    QueueManager, RepeatMode,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

// ===== Helpers =====

fn queue_of(len: usize) -> QueueManager {
    let mut queue = QueueManager::new();
    for i in 0..len {
        queue.enqueue(hymn(&format!("t{}", i)), EnqueuePosition::End);
    }
    queue
}

fn ids(queue: &QueueManager) -> Vec<String> {
    queue
        .entries()
        .into_iter()
        .map(|entry| entry.track.id.to_string())
        .collect()
}

fn current_id(queue: &QueueManager) -> Option<String> {
    queue.current_track().map(|track| track.id.to_string())
}

/// Queue with a valid current index
fn queue_with_current() -> impl Strategy<Value = (usize, usize)> {
    (1usize..40).prop_flat_map(|len| (Just(len), 0..len))
}

#[derive(Debug, Clone)]
enum Command {
    Enqueue(u8, bool),
    Next,
    Previous,
    Play,
    Pause,
    Stop,
    Seek(f64),
    Remove(u8),
    CanPlay,
    TimeUpdate(f64),
    Ended,
    Repeat(u8),
    Shuffle(bool),
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u8..8, any::<bool>()).prop_map(|(id, next)| Command::Enqueue(id, next)),
        Just(Command::Next),
        Just(Command::Previous),
        Just(Command::Play),
        Just(Command::Pause),
        Just(Command::Stop),
        (-100.0f64..400.0).prop_map(Command::Seek),
        (0u8..8).prop_map(Command::Remove),
        Just(Command::CanPlay),
        (-10.0f64..400.0).prop_map(Command::TimeUpdate),
        Just(Command::Ended),
        (0u8..3).prop_map(Command::Repeat),
        any::<bool>().prop_map(Command::Shuffle),
    ]
}

fn apply(session: &mut PlaybackSession, element: &FakeMediaElement, command: Command) {
    match command {
        Command::Enqueue(id, next) => {
            let position = if next { EnqueuePosition::Next } else { EnqueuePosition::End };
            session.enqueue(hymn(&format!("t{}", id)), position).unwrap();
        }
        Command::Next => session.skip(Direction::Next),
        Command::Previous => session.skip(Direction::Previous),
        Command::Play => session.play(),
        Command::Pause => session.pause(),
        Command::Stop => session.stop(),
        Command::Seek(seconds) => {
            session.seek(seconds);
        }
        Command::Remove(id) => {
            let _ = session.remove_from_queue(&TrackId::new(format!("t{}", id)));
        }
        Command::CanPlay => common::fire(session, element, BackendEvent::CanPlay),
        Command::TimeUpdate(seconds) => common::fire(session, element, BackendEvent::TimeUpdate(seconds)),
        Command::Ended => common::fire(session, element, BackendEvent::Ended),
        Command::Repeat(mode) => session.set_repeat(match mode {
            0 => RepeatMode::Off,
            1 => RepeatMode::One,
            _ => RepeatMode::All,
        }),
        Command::Shuffle(enabled) => session.set_shuffle(enabled),
    }
}

// ===== Queue Properties =====

proptest! {
    /// Property: shuffling is a permutation with the playing entry first
    #[test]
    fn shuffle_is_permutation_with_current_first((len, current) in queue_with_current(), seed in any::<u64>()) {
        let mut queue = queue_of(len);
        queue.set_current(current).unwrap();
        let before: HashSet<_> = ids(&queue).into_iter().collect();
        let playing = current_id(&queue);

        queue.shuffle(true, &mut StdRng::seed_from_u64(seed));

        let after = ids(&queue);
        prop_assert_eq!(after.len(), len);
        prop_assert_eq!(after.iter().cloned().collect::<HashSet<_>>(), before);
        prop_assert_eq!(Some(after[0].clone()), playing.clone());
        prop_assert_eq!(current_id(&queue), playing);
    }

    /// Property: turning shuffle off restores the original order
    #[test]
    fn unshuffle_restores_sequence((len, current) in queue_with_current(), seed in any::<u64>()) {
        let mut queue = queue_of(len);
        queue.set_current(current).unwrap();
        let original = ids(&queue);

        let mut rng = StdRng::seed_from_u64(seed);
        queue.shuffle(true, &mut rng);
        queue.shuffle(false, &mut rng);

        prop_assert_eq!(ids(&queue), original);
        prop_assert_eq!(queue.current_index(), Some(current));
    }

    /// Property: removing an entry before the playing one shifts the index
    #[test]
    fn remove_before_current_keeps_playing_track((len, current) in queue_with_current(), pick in any::<prop::sample::Index>()) {
        prop_assume!(current > 0);
        let removed = pick.index(current);

        let mut queue = queue_of(len);
        queue.set_current(current).unwrap();
        let playing = current_id(&queue);

        queue.remove(&TrackId::new(format!("t{}", removed)), RepeatMode::Off);

        prop_assert_eq!(queue.len(), len - 1);
        prop_assert_eq!(queue.current_index(), Some(current - 1));
        prop_assert_eq!(current_id(&queue), playing);
    }

    /// Property: reordering never changes which track is playing
    #[test]
    fn reorder_keeps_playing_track(
        (len, current) in queue_with_current(),
        from in any::<prop::sample::Index>(),
        to in any::<prop::sample::Index>(),
    ) {
        let mut queue = queue_of(len);
        queue.set_current(current).unwrap();
        let playing = current_id(&queue);

        queue.reorder(from.index(len), to.index(len)).unwrap();

        prop_assert_eq!(queue.len(), len);
        prop_assert_eq!(current_id(&queue), playing);
    }
}

// ===== Session Properties =====

proptest! {
    /// Property: seek always lands within the track
    #[test]
    fn seek_within_duration(duration in 1.0f64..600.0, target in -1000.0f64..2000.0) {
        let (mut session, element) = common::session();
        session.play_track(hymn("t0").with_duration(duration)).unwrap();
        common::fire(&mut session, &element, BackendEvent::CanPlay);

        let applied = session.seek(target);

        prop_assert!((0.0..=duration).contains(&applied));
        prop_assert_eq!(session.state().current_time_seconds, applied);
    }

    /// Property: any command sequence keeps session state coherent
    #[test]
    fn random_commands_keep_state_coherent(commands in prop::collection::vec(command(), 1..60)) {
        let (mut session, element) = common::session_with(PlaybackConfig::default());

        for command in commands {
            let loads_before = element.load_count();
            apply(&mut session, &element, command);

            let state = session.state();
            match state.status {
                PlaybackStatus::Idle => prop_assert!(state.current_track.is_none()),
                PlaybackStatus::Loading | PlaybackStatus::Playing | PlaybackStatus::Paused | PlaybackStatus::Ended => {
                    prop_assert!(state.current_track.is_some())
                }
                PlaybackStatus::Error => prop_assert!(state.last_error.is_some()),
            }

            prop_assert!(state.current_time_seconds >= 0.0);
            if state.duration_seconds > 0.0 {
                prop_assert!(state.current_time_seconds <= state.duration_seconds);
            }

            // At most one source is assigned per command
            prop_assert!(element.load_count() - loads_before <= 1);

            let queue = session.queue();
            if let Some(index) = queue.current_index() {
                prop_assert!(index < queue.len());
            }
            prop_assert_eq!(session.snapshot().queue.len(), queue.len());
        }
    }
}
