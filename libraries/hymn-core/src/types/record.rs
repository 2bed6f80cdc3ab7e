//! Catalog records the player can be handed
//!
//! These mirror the rows the catalog pages already hold in memory. The player
//! never fetches them; callers pass them in and `TrackResolver` maps them.

use serde::{Deserialize, Serialize};

/// Hymn from the hymnal catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HymnRecord {
    pub id: String,

    /// Hymnal number (shown as a title prefix when present)
    #[serde(default)]
    pub number: Option<u32>,

    pub title: String,

    #[serde(default)]
    pub composer: Option<String>,

    #[serde(default)]
    pub duration_seconds: Option<f64>,

    #[serde(default)]
    pub cover_url: Option<String>,

    /// Absolute URL or path relative to the media base URL
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Narrated Bible chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleChapterRecord {
    pub id: String,

    /// Book name, e.g. "John"
    pub book: String,

    pub chapter: u32,

    #[serde(default)]
    pub narrator: Option<String>,

    #[serde(default)]
    pub duration_seconds: Option<f64>,

    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Row of a user playlist
///
/// Rows that point at a catalog hymn carry `hymn_id`; the resolved track then
/// takes the hymn's id so "next/previous" and history treat it as that hymn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRow {
    /// Row identifier inside the playlist
    pub id: String,

    #[serde(default)]
    pub hymn_id: Option<String>,

    pub title: String,

    #[serde(default)]
    pub artist: Option<String>,

    #[serde(default)]
    pub duration_seconds: Option<f64>,

    #[serde(default)]
    pub cover_url: Option<String>,

    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Any record `TrackResolver` accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TrackRecord {
    Hymn(HymnRecord),
    BibleChapter(BibleChapterRecord),
    PlaylistRow(PlaylistRow),
}

impl TrackRecord {
    /// Identifier the resolved track will carry
    pub fn track_id(&self) -> &str {
        match self {
            Self::Hymn(hymn) => &hymn.id,
            Self::BibleChapter(chapter) => &chapter.id,
            Self::PlaylistRow(row) => row.hymn_id.as_deref().unwrap_or(&row.id),
        }
    }
}

impl From<HymnRecord> for TrackRecord {
    fn from(record: HymnRecord) -> Self {
        Self::Hymn(record)
    }
}

impl From<BibleChapterRecord> for TrackRecord {
    fn from(record: BibleChapterRecord) -> Self {
        Self::BibleChapter(record)
    }
}

impl From<PlaylistRow> for TrackRecord {
    fn from(record: PlaylistRow) -> Self {
        Self::PlaylistRow(record)
    }
}
