//! Core types for playback management

use chrono::{DateTime, Utc};
use hymn_core::{Track, TrackId, TrackRecord};
use serde::{Deserialize, Serialize};

/// Session status
///
/// ```text
/// Idle ─▶ Loading ─▶ Playing ⇄ Paused
///            any ─▶ Ended | Error
///  Ended | Error ─▶ Loading (new play)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track selected
    #[default]
    Idle,

    /// Source assigned, waiting for the backend to report it can play
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Reached the end with nothing left to play
    Ended,

    /// Backend failed; see `last_error`
    Error,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the collection ends
    #[default]
    Off,

    /// Loop the current track only
    One,

    /// Loop the entire collection
    All,
}

impl RepeatMode {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::One => "one",
            Self::All => "all",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "one" => Some(Self::One),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Mode used for user-initiated skips
    ///
    /// Repeat-one only governs natural track completion; pressing "next"
    /// always moves on.
    pub(crate) fn for_manual_skip(self) -> Self {
        match self {
            Self::One => Self::Off,
            other => other,
        }
    }
}

impl std::fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Skip direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Build from a signed step (`+1` / `-1`); zero is not a direction
    pub fn from_step(step: i32) -> Option<Self> {
        match step.signum() {
            1 => Some(Self::Next),
            -1 => Some(Self::Previous),
            _ => None,
        }
    }
}

/// Where `enqueue` places a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnqueuePosition {
    /// Append to the end of the queue
    #[default]
    End,

    /// Insert immediately after the playing entry
    Next,
}

/// One queued track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub track: Track,
    pub enqueued_at: DateTime<Utc>,
}

impl QueueEntry {
    /// Wrap a track, stamped now
    pub fn new(track: Track) -> Self {
        Self {
            track,
            enqueued_at: Utc::now(),
        }
    }
}

/// What `play_track` / `enqueue` accept
#[derive(Debug, Clone, PartialEq)]
pub enum PlayTarget {
    /// Already resolved track
    Track(Track),

    /// Catalog record, resolved on the way in
    Record(TrackRecord),

    /// Known id, looked up in the active collection, the queue, then history
    Id(TrackId),
}

impl From<Track> for PlayTarget {
    fn from(track: Track) -> Self {
        Self::Track(track)
    }
}

impl From<TrackRecord> for PlayTarget {
    fn from(record: TrackRecord) -> Self {
        Self::Record(record)
    }
}

impl From<TrackId> for PlayTarget {
    fn from(id: TrackId) -> Self {
        Self::Id(id)
    }
}

/// Observable session state
///
/// `Playing` implies `current_track.is_some()`; `Idle` implies it is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    pub current_track: Option<Track>,
    pub current_time_seconds: f64,

    /// Backend-reported duration, or the catalog duration until one arrives
    pub duration_seconds: f64,

    /// Volume level (0.0-1.0)
    pub volume: f32,
    pub is_muted: bool,
    pub last_error: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            status: PlaybackStatus::Idle,
            current_track: None,
            current_time_seconds: 0.0,
            duration_seconds: 0.0,
            volume: 0.8,
            is_muted: false,
            last_error: None,
        }
    }
}

impl PlaybackState {
    /// Whether audio is (supposed to be) audible right now
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}
