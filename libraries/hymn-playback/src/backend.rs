//! Audio backend adapter
//!
//! Wraps a single platform media element behind a minimal imperative surface
//! and normalizes the events it emits. Every source assignment gets a fresh
//! [`LoadGeneration`]; events tagged with an older generation are dropped, so
//! a slow load that finishes after the user moved on can never hijack state.

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Monotonic counter identifying one source assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadGeneration(u64);

impl LoadGeneration {
    /// Wrap a raw counter value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Event reported by the media element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum BackendEvent {
    /// Playback position moved (seconds)
    TimeUpdate(f64),

    /// Media duration became known or changed (seconds)
    DurationChange(f64),

    /// Enough data buffered to start
    CanPlay,

    /// Reached the end of the media
    Ended,

    /// Loading or decoding failed
    Error(String),

    /// A play request was refused after it was issued
    Rejected(String),
}

/// Backend event tagged with the load it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedEvent {
    pub generation: LoadGeneration,
    pub event: BackendEvent,
}

impl TaggedEvent {
    pub fn new(generation: LoadGeneration, event: BackendEvent) -> Self {
        Self { generation, event }
    }
}

/// Platform media element
///
/// Implementations own exactly one underlying element (an `<audio>` tag in
/// the browser, a fake in tests) and report its events tagged with the
/// generation passed to the most recent `set_source`.
#[cfg_attr(test, mockall::automock)]
pub trait MediaElement {
    /// Point the element at `url`, replacing any in-flight load
    fn set_source(&mut self, url: &str, generation: LoadGeneration);

    /// Drop the current source so it stops buffering
    fn clear_source(&mut self);

    /// Start playback
    ///
    /// Returns `Err` when the platform refuses synchronously. Asynchronous
    /// refusals arrive later as [`BackendEvent::Rejected`].
    fn play(&mut self) -> std::result::Result<(), String>;

    fn pause(&mut self);

    fn set_current_time(&mut self, seconds: f64);

    /// Volume in 0.0-1.0
    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);
}

/// Owns the media element and filters what it reports
pub struct AudioBackendAdapter {
    element: Box<dyn MediaElement>,
    generation: LoadGeneration,
    loaded: bool,
    duration: Option<f64>,
    can_play_seen: bool,
    ended_seen: bool,
}

impl AudioBackendAdapter {
    pub fn new(element: Box<dyn MediaElement>) -> Self {
        Self {
            element,
            generation: LoadGeneration::default(),
            loaded: false,
            duration: None,
            can_play_seen: false,
            ended_seen: false,
        }
    }

    /// Generation of the current source
    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    /// Best known duration of the current source
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Tear down the current source and assign `url`
    ///
    /// `duration_hint` (the catalog duration) bounds seeks until the element
    /// reports the real duration.
    pub fn load(&mut self, url: &str, duration_hint: Option<f64>) -> LoadGeneration {
        if self.loaded {
            self.element.pause();
            self.element.clear_source();
        }

        self.generation = self.generation.next();
        self.loaded = true;
        self.duration = duration_hint.filter(|d| d.is_finite() && *d > 0.0);
        self.can_play_seen = false;
        self.ended_seen = false;

        debug!(generation = self.generation.value(), url, "Assigning media source");
        self.element.set_source(url, self.generation);
        self.generation
    }

    /// Release the source entirely; later events from it are stale
    pub fn unload(&mut self) {
        if !self.loaded {
            return;
        }
        self.element.pause();
        self.element.clear_source();
        self.generation = self.generation.next();
        self.loaded = false;
        self.duration = None;
    }

    /// Ask the element to play
    pub fn play(&mut self) -> Result<()> {
        if !self.loaded {
            return Err(PlaybackError::BackendRejected("no source loaded".to_string()));
        }
        self.element.play().map_err(PlaybackError::BackendRejected)
    }

    /// Idempotent
    pub fn pause(&mut self) {
        if self.loaded {
            self.element.pause();
        }
    }

    /// Seek within the current source
    ///
    /// Clamped to `[0, duration]`; with no known duration only the lower
    /// bound applies. Returns the position actually requested.
    pub fn seek(&mut self, seconds: f64) -> f64 {
        let target = clamp_position(seconds, self.duration);
        if self.loaded {
            self.element.set_current_time(target);
            if self.duration.map_or(true, |d| target < d) {
                self.ended_seen = false;
            }
        }
        target
    }

    /// Seek to the start and play again (repeat-one replay)
    pub fn restart(&mut self) -> Result<()> {
        self.seek(0.0);
        self.ended_seen = false;
        self.play()
    }

    /// Clamp and apply volume, returning the applied level
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        let level = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.element.set_volume(level);
        level
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }

    /// Filter a raw element event
    ///
    /// Returns `None` for stale generations, for repeats of `CanPlay` and
    /// `Ended` within one load, and for nonsensical durations. Time updates are
    /// clamped into the known duration.
    pub fn accept(&mut self, tagged: TaggedEvent) -> Option<BackendEvent> {
        if !self.loaded || tagged.generation != self.generation {
            trace!(
                event_generation = tagged.generation.value(),
                current_generation = self.generation.value(),
                "Dropping stale backend event"
            );
            return None;
        }

        match tagged.event {
            BackendEvent::CanPlay => {
                if self.can_play_seen {
                    return None;
                }
                self.can_play_seen = true;
                Some(BackendEvent::CanPlay)
            }
            BackendEvent::Ended => {
                if self.ended_seen {
                    return None;
                }
                self.ended_seen = true;
                Some(BackendEvent::Ended)
            }
            BackendEvent::DurationChange(seconds) => {
                if !seconds.is_finite() || seconds <= 0.0 {
                    return None;
                }
                self.duration = Some(seconds);
                Some(BackendEvent::DurationChange(seconds))
            }
            BackendEvent::TimeUpdate(seconds) => {
                Some(BackendEvent::TimeUpdate(clamp_position(seconds, self.duration)))
            }
            other => Some(other),
        }
    }
}

impl std::fmt::Debug for AudioBackendAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBackendAdapter")
            .field("generation", &self.generation)
            .field("loaded", &self.loaded)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

fn clamp_position(seconds: f64, duration: Option<f64>) -> f64 {
    if seconds.is_nan() {
        return 0.0;
    }
    match duration {
        Some(duration) => seconds.clamp(0.0, duration),
        None => seconds.max(0.0),
    }
}
