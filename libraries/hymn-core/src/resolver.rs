//! Track resolution
//!
//! Maps catalog records into playable [`Track`]s. Pure: the only work done is
//! URL construction, no network or storage access.

use crate::error::{ResolutionError, Result};
use crate::types::track::sanitize_seconds;
use crate::types::{
    BibleChapterRecord, HymnRecord, PlaylistRow, SourceType, Track, TrackId, TrackRecord,
};
use url::Url;

const UNKNOWN_COMPOSER: &str = "Unknown";
const DEFAULT_NARRATOR: &str = "Narrated Bible";

/// Turns catalog records into tracks with absolute URLs
///
/// Absolute audio and cover URLs pass through unchanged. Relative paths are
/// joined onto the media base URL; without a base they cannot be played.
#[derive(Debug, Clone, Default)]
pub struct TrackResolver {
    media_base_url: Option<Url>,
}

impl TrackResolver {
    /// Resolver that only accepts absolute URLs
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that joins relative paths onto `base`
    ///
    /// A trailing slash is added when missing so `base/path` keeps the last
    /// segment of the base.
    pub fn with_base_url(base: &str) -> Result<Self> {
        let normalized = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let url = Url::parse(&normalized)
            .map_err(|_| ResolutionError::InvalidBaseUrl(base.to_string()))?;

        Ok(Self {
            media_base_url: Some(url),
        })
    }

    /// Configured media base URL
    pub fn media_base_url(&self) -> Option<&Url> {
        self.media_base_url.as_ref()
    }

    /// Resolve any supported record
    pub fn resolve(&self, record: &TrackRecord) -> Result<Track> {
        match record {
            TrackRecord::Hymn(hymn) => self.resolve_hymn(hymn),
            TrackRecord::BibleChapter(chapter) => self.resolve_bible_chapter(chapter),
            TrackRecord::PlaylistRow(row) => self.resolve_playlist_row(row),
        }
    }

    /// Resolve a hymn
    pub fn resolve_hymn(&self, hymn: &HymnRecord) -> Result<Track> {
        let audio_url = self.audio_url(&hymn.id, hymn.audio_url.as_deref())?;
        let title = match hymn.number {
            Some(number) => format!("{}. {}", number, hymn.title),
            None => hymn.title.clone(),
        };

        Ok(Track {
            id: TrackId::new(hymn.id.clone()),
            title,
            artist: non_empty(hymn.composer.as_deref()).unwrap_or(UNKNOWN_COMPOSER).to_string(),
            duration_seconds: sanitize_seconds(hymn.duration_seconds.unwrap_or_default()),
            cover_url: self.cover_url(hymn.cover_url.as_deref()),
            audio_url,
            source_type: SourceType::Hymn,
        })
    }

    /// Resolve a narrated Bible chapter
    pub fn resolve_bible_chapter(&self, chapter: &BibleChapterRecord) -> Result<Track> {
        let audio_url = self.audio_url(&chapter.id, chapter.audio_url.as_deref())?;

        Ok(Track {
            id: TrackId::new(chapter.id.clone()),
            title: format!("{} {}", chapter.book, chapter.chapter),
            artist: non_empty(chapter.narrator.as_deref())
                .unwrap_or(DEFAULT_NARRATOR)
                .to_string(),
            duration_seconds: sanitize_seconds(chapter.duration_seconds.unwrap_or_default()),
            cover_url: self.cover_url(chapter.cover_url.as_deref()),
            audio_url,
            source_type: SourceType::Bible,
        })
    }

    /// Resolve a playlist row
    pub fn resolve_playlist_row(&self, row: &PlaylistRow) -> Result<Track> {
        let id = row.hymn_id.clone().unwrap_or_else(|| row.id.clone());
        let audio_url = self.audio_url(&id, row.audio_url.as_deref())?;
        let source_type = if row.hymn_id.is_some() {
            SourceType::Hymn
        } else {
            SourceType::Adhoc
        };

        Ok(Track {
            id: TrackId::new(id),
            title: row.title.clone(),
            artist: non_empty(row.artist.as_deref()).unwrap_or(UNKNOWN_COMPOSER).to_string(),
            duration_seconds: sanitize_seconds(row.duration_seconds.unwrap_or_default()),
            cover_url: self.cover_url(row.cover_url.as_deref()),
            audio_url,
            source_type,
        })
    }

    fn audio_url(&self, id: &str, raw: Option<&str>) -> Result<String> {
        let raw = non_empty(raw).ok_or_else(|| ResolutionError::missing_audio_url(id))?;

        match Url::parse(raw) {
            Ok(url) => Ok(url.to_string()),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self
                    .media_base_url
                    .as_ref()
                    .ok_or_else(|| ResolutionError::missing_audio_url(id))?;
                base.join(raw.trim_start_matches('/'))
                    .map(|url| url.to_string())
                    .map_err(|_| ResolutionError::invalid_audio_url(id, raw))
            }
            Err(_) => Err(ResolutionError::invalid_audio_url(id, raw)),
        }
    }

    /// Cover art is cosmetic: anything unresolvable becomes an empty string
    fn cover_url(&self, raw: Option<&str>) -> String {
        let Some(raw) = non_empty(raw) else {
            return String::new();
        };

        match Url::parse(raw) {
            Ok(url) => url.to_string(),
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .media_base_url
                .as_ref()
                .and_then(|base| base.join(raw.trim_start_matches('/')).ok())
                .map(|url| url.to_string())
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
