//! Hymn Player Core
//!
//! Platform-agnostic domain types and track resolution for Hymn Player.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackId`, `SourceType`
//! - **Source Records**: `HymnRecord`, `BibleChapterRecord`, `PlaylistRow`
//! - **Track Resolution**: `TrackResolver` turns a source record into a
//!   playable `Track` with an absolute audio URL
//!
//! # Example
//!
//! ```rust
//! use hymn_core::{HymnRecord, SourceType, TrackRecord, TrackResolver};
//!
//! let resolver = TrackResolver::with_base_url("https://media.example.org/audio/").unwrap();
//!
//! let record = TrackRecord::Hymn(HymnRecord {
//!     id: "h-001".to_string(),
//!     number: Some(1),
//!     title: "Holy, Holy, Holy".to_string(),
//!     composer: Some("John B. Dykes".to_string()),
//!     duration_seconds: Some(182.0),
//!     cover_url: None,
//!     audio_url: Some("hymns/001.mp3".to_string()),
//! });
//!
//! let track = resolver.resolve(&record).unwrap();
//! assert_eq!(track.audio_url, "https://media.example.org/audio/hymns/001.mp3");
//! assert_eq!(track.source_type, SourceType::Hymn);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod resolver;
pub mod types;

pub use error::{ResolutionError, Result};
pub use resolver::TrackResolver;
pub use types::{
    BibleChapterRecord, HymnRecord, PlaylistRow, SourceType, Track, TrackId, TrackRecord,
};
