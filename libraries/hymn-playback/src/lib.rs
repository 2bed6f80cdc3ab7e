//! Hymn Player - Playback Session
//!
//! Platform-agnostic playback management for Hymn Player.
//!
//! This crate provides:
//! - A single-element playback session (load, play, pause, seek, skip)
//! - User queue with lossless shuffle and "play next"
//! - Playback contexts (queue, playlist, album, Bible book)
//! - Repeat modes (Off, All, One)
//! - Bounded history for "previous"
//! - Debounced snapshot persistence (last track, position, volume, mute)
//!
//! # Architecture
//!
//! `hymn-playback` never touches audio directly. The platform supplies one
//! [`MediaElement`] (an `<audio>` tag in the browser) and forwards its events
//! back through [`PlaybackSession::handle_backend_event`]. Every source
//! assignment carries a [`LoadGeneration`], so events from an abandoned load
//! are ignored.
//!
//! # Example: Queue Playback
//!
//! ```rust
//! use hymn_playback::test_utils::{hymn, FakeMediaElement};
//! use hymn_playback::{
//!     BackendEvent, Direction, EnqueuePosition, PlaybackConfig, PlaybackSession, PlaybackStatus,
//! };
//!
//! let element = FakeMediaElement::new();
//! let mut session = PlaybackSession::new(PlaybackConfig::default(), Box::new(element.clone())).unwrap();
//!
//! session.enqueue(hymn("1"), EnqueuePosition::End).unwrap();
//! session.enqueue(hymn("2"), EnqueuePosition::End).unwrap();
//!
//! session.skip(Direction::Next);
//! session.handle_backend_event(element.event(BackendEvent::CanPlay));
//! assert_eq!(session.state().status, PlaybackStatus::Playing);
//!
//! // Natural end moves on to the next queued hymn
//! session.handle_backend_event(element.event(BackendEvent::Ended));
//! assert_eq!(session.state().current_track.as_ref().unwrap().id, "2");
//! ```
//!
//! # Example: Playlist Context
//!
//! ```rust
//! use hymn_playback::test_utils::{hymns, FakeMediaElement};
//! use hymn_playback::{ContextRequest, ContextType, PlaybackConfig, PlaybackSession, RepeatMode};
//!
//! let mut session =
//!     PlaybackSession::new(PlaybackConfig::default(), Box::new(FakeMediaElement::new())).unwrap();
//!
//! let request = ContextRequest::collection(ContextType::Playlist, "sunday", hymns(&["a", "b", "c"]), 1);
//! let start = session.set_playback_context(request).unwrap();
//! session.play_track(start.unwrap()).unwrap();
//! session.set_repeat(RepeatMode::All);
//!
//! assert_eq!(session.context().position_index, Some(1));
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod context;
mod error;
pub mod events;
mod history;
pub mod persistence;
pub mod queue;
mod session;
mod shuffle;
pub mod types;
mod volume;

#[cfg(feature = "test-utils")]
pub mod test_utils;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use backend::{AudioBackendAdapter, BackendEvent, LoadGeneration, MediaElement, TaggedEvent};
pub use config::PlaybackConfig;
pub use context::{ContextRequest, ContextType, PlaybackContext};
pub use error::{PersistenceError, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use history::History;
pub use persistence::{JsonFileStore, MemoryStore, PersistedSnapshot, SnapshotStore};
pub use queue::{QueueManager, Removal};
pub use session::{PlaybackSession, PlaybackSnapshot, RestorePoint};
pub use types::{
    Direction, EnqueuePosition, PlayTarget, PlaybackState, PlaybackStatus, QueueEntry, RepeatMode,
};
pub use volume::Volume;
