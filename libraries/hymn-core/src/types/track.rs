//! Track domain type

use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a track came from in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Hymn from the hymnal catalog
    Hymn,

    /// Narrated Bible chapter
    Bible,

    /// Anything else a caller hands the player (uploaded or playlist-only rows)
    Adhoc,
}

impl SourceType {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hymn => "hymn",
            Self::Bible => "bible",
            Self::Adhoc => "adhoc",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hymn" => Some(Self::Hymn),
            "bible" => Some(Self::Bible),
            "adhoc" => Some(Self::Adhoc),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Playable audio unit
///
/// Immutable once resolved: the player never edits a track in place. When the
/// backend reports the real duration it is kept in the playback state, not
/// written back here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Display title
    pub title: String,

    /// Composer, performer or narrator
    pub artist: String,

    /// Catalog duration in seconds (0 when unknown)
    pub duration_seconds: f64,

    /// Absolute cover art URL (empty when the record has none)
    pub cover_url: String,

    /// Absolute audio URL
    pub audio_url: String,

    /// Catalog origin
    pub source_type: SourceType,
}

impl Track {
    /// Create a track with no cover art and unknown duration
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_seconds: 0.0,
            cover_url: String::new(),
            audio_url: audio_url.into(),
            source_type,
        }
    }

    /// Set the catalog duration
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = sanitize_seconds(seconds);
        self
    }

    /// Set the cover art URL
    #[must_use]
    pub fn with_cover(mut self, cover_url: impl Into<String>) -> Self {
        self.cover_url = cover_url.into();
        self
    }

    /// Catalog duration as a `Duration`, `None` while unknown
    pub fn duration(&self) -> Option<Duration> {
        (self.duration_seconds > 0.0).then(|| Duration::from_secs_f64(self.duration_seconds))
    }
}

/// Negative, NaN and infinite durations collapse to 0 (unknown)
pub(crate) fn sanitize_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_creation() {
        let track = Track::new("h1", "Amazing Grace", "John Newton", "https://a/1.mp3", SourceType::Hymn);
        assert_eq!(track.id, "h1");
        assert_eq!(track.duration_seconds, 0.0);
        assert!(track.duration().is_none());
        assert!(track.cover_url.is_empty());
    }

    #[test]
    fn track_duration_conversion() {
        let track = Track::new("h1", "T", "A", "https://a/1.mp3", SourceType::Hymn).with_duration(180.0);
        assert_eq!(track.duration(), Some(Duration::from_secs(180)));
    }

    #[test]
    fn invalid_durations_are_unknown() {
        for bad in [-5.0, f64::NAN, f64::INFINITY] {
            let track = Track::new("h1", "T", "A", "https://a/1.mp3", SourceType::Hymn).with_duration(bad);
            assert_eq!(track.duration_seconds, 0.0);
        }
    }

    #[test]
    fn source_type_round_trips_through_str() {
        for source in [SourceType::Hymn, SourceType::Bible, SourceType::Adhoc] {
            assert_eq!(SourceType::from_str(source.as_str()), Some(source));
        }
        assert_eq!(SourceType::from_str("podcast"), None);
    }

    #[test]
    fn track_serializes_camel_case() {
        let track = Track::new("b1", "John 3", "Narrator", "https://a/j3.mp3", SourceType::Bible);
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["sourceType"], "bible");
        assert_eq!(json["audioUrl"], "https://a/j3.mp3");
        assert!(json.get("durationSeconds").is_some());
    }
}
