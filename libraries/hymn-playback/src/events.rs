//! Playback events
//!
//! Emitted by the session for UI synchronization:
//! - Status changes (loading/playing/paused/ended/error)
//! - Track changes, including repeat-one replays that keep the same track
//! - Position and duration updates reported by the media element
//! - Volume, queue and context changes

use crate::context::PlaybackContext;
use crate::types::PlaybackStatus;
use hymn_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Session status changed
    StateChanged { status: PlaybackStatus },

    /// A track was assigned to the media element
    TrackChanged {
        track_id: TrackId,
        previous_track_id: Option<TrackId>,
    },

    /// Track reached its end naturally
    TrackFinished { track_id: TrackId },

    /// Position update, as often as the media element reports it
    PositionUpdate { position_seconds: f64 },

    /// Duration became known
    DurationChanged { duration_seconds: f64 },

    VolumeChanged { volume: f32, is_muted: bool },

    /// Queue contents or order changed
    QueueChanged { length: usize },

    ContextChanged { context: PlaybackContext },

    /// Backend failure captured into state
    Error { message: String },
}

impl PlaybackEvent {
    /// Short event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "stateChanged",
            Self::TrackChanged { .. } => "trackChanged",
            Self::TrackFinished { .. } => "trackFinished",
            Self::PositionUpdate { .. } => "positionUpdate",
            Self::DurationChanged { .. } => "durationChanged",
            Self::VolumeChanged { .. } => "volumeChanged",
            Self::QueueChanged { .. } => "queueChanged",
            Self::ContextChanged { .. } => "contextChanged",
            Self::Error { .. } => "error",
        }
    }
}
