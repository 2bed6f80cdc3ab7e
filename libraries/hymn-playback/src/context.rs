//! Playback context
//!
//! Decides what "next" and "previous" mean. The active context is either the
//! user queue or a fixed collection (playlist, album, Bible book) the caller
//! handed over with a start position. Collections are owned snapshots: later
//! edits to the source playlist do not leak into an active session.

use crate::error::{PlaybackError, Result};
use crate::queue::QueueManager;
use crate::types::{Direction, RepeatMode};
use hymn_core::{Track, TrackId};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Kind of collection driving navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    #[default]
    Queue,
    Playlist,
    Album,
    Bible,
}

impl ContextType {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Playlist => "playlist",
            Self::Album => "album",
            Self::Bible => "bible",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queue" => Some(Self::Queue),
            "playlist" => Some(Self::Playlist),
            "album" => Some(Self::Album),
            "bible" => Some(Self::Bible),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observable description of the active context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackContext {
    pub context_type: ContextType,

    /// Playlist/album/book identifier; `None` for the queue
    pub ref_id: Option<String>,

    /// Position of the current track; `None` when nothing in the context is
    /// current (e.g. an empty queue)
    pub position_index: Option<usize>,
}

/// Request to switch contexts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextRequest {
    #[serde(rename = "type")]
    pub context_type: ContextType,

    #[serde(default)]
    pub ref_id: Option<String>,

    /// Collection tracks in order; for `Queue` a non-empty list replaces the
    /// queue contents
    #[serde(default)]
    pub tracks: Vec<Track>,

    #[serde(default)]
    pub start_index: usize,
}

impl ContextRequest {
    /// Collection context starting at `start_index`
    pub fn collection(
        context_type: ContextType,
        ref_id: impl Into<String>,
        tracks: Vec<Track>,
        start_index: usize,
    ) -> Self {
        Self {
            context_type,
            ref_id: Some(ref_id.into()),
            tracks,
            start_index,
        }
    }

    /// Switch back to the user queue, keeping its contents
    pub fn queue() -> Self {
        Self {
            context_type: ContextType::Queue,
            ref_id: None,
            tracks: Vec::new(),
            start_index: 0,
        }
    }
}

#[derive(Debug, Clone)]
enum ActiveContext {
    Queue,
    Collection {
        context_type: ContextType,
        ref_id: Option<String>,
        tracks: Vec<Track>,
        position: usize,
    },
}

/// Navigation over the active context
#[derive(Debug, Clone)]
pub struct ContextResolver {
    active: ActiveContext,
}

impl Default for ContextResolver {
    fn default() -> Self {
        Self {
            active: ActiveContext::Queue,
        }
    }
}

impl ContextResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active context atomically
    ///
    /// Nothing changes when the request is rejected. Returns the track at the
    /// start position, if any.
    pub fn set_context<R: Rng + ?Sized>(
        &mut self,
        request: ContextRequest,
        queue: &mut QueueManager,
        rng: &mut R,
    ) -> Result<Option<Track>> {
        let ContextRequest {
            context_type,
            ref_id,
            tracks,
            start_index,
        } = request;

        if context_type == ContextType::Queue {
            if !tracks.is_empty() {
                if start_index >= tracks.len() {
                    return Err(out_of_range(start_index, tracks.len()));
                }
                queue.replace(tracks, Some(start_index), rng);
            } else if !queue.is_empty() && start_index != 0 {
                if start_index >= queue.len() {
                    return Err(out_of_range(start_index, queue.len()));
                }
                queue.set_current(start_index)?;
            }
            self.active = ActiveContext::Queue;
            return Ok(queue.current_track().cloned());
        }

        if tracks.is_empty() {
            return Err(PlaybackError::InvalidContext(format!(
                "{} context needs at least one track",
                context_type
            )));
        }
        if start_index >= tracks.len() {
            return Err(out_of_range(start_index, tracks.len()));
        }

        let start = tracks[start_index].clone();
        self.active = ActiveContext::Collection {
            context_type,
            ref_id,
            tracks,
            position: start_index,
        };
        Ok(Some(start))
    }

    pub fn context_type(&self) -> ContextType {
        match &self.active {
            ActiveContext::Queue => ContextType::Queue,
            ActiveContext::Collection { context_type, .. } => *context_type,
        }
    }

    /// Step through the active context
    ///
    /// `Next` wraps only under `RepeatMode::All`; `One` repeats the current
    /// position. `Previous` never wraps. `None` leaves the position as is.
    pub fn advance(&mut self, direction: Direction, repeat: RepeatMode, queue: &mut QueueManager) -> Option<Track> {
        match &mut self.active {
            ActiveContext::Queue => match direction {
                Direction::Next => queue.advance(repeat),
                Direction::Previous => queue.retreat(),
            },
            ActiveContext::Collection { tracks, position, .. } => {
                let next = match direction {
                    Direction::Next if repeat == RepeatMode::One => Some(*position),
                    Direction::Next if *position + 1 < tracks.len() => Some(*position + 1),
                    Direction::Next if repeat == RepeatMode::All => Some(0),
                    Direction::Next => None,
                    Direction::Previous => position.checked_sub(1),
                }?;
                *position = next;
                tracks.get(next).cloned()
            }
        }
    }

    /// Point the context at `id` when it contains it
    ///
    /// Used when the user picks a track directly; a track outside the
    /// context leaves the position untouched.
    pub fn select(&mut self, id: &TrackId, queue: &mut QueueManager) -> bool {
        match &mut self.active {
            ActiveContext::Queue => queue.select(id).is_some(),
            ActiveContext::Collection { tracks, position, .. } => {
                if tracks.get(*position).is_some_and(|track| &track.id == id) {
                    return true;
                }
                match tracks.iter().position(|track| &track.id == id) {
                    Some(index) => {
                        *position = index;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Track with `id` inside the active collection
    pub fn find<'a>(&'a self, id: &TrackId, queue: &'a QueueManager) -> Option<&'a Track> {
        match &self.active {
            ActiveContext::Queue => queue.find(id),
            ActiveContext::Collection { tracks, .. } => tracks.iter().find(|track| &track.id == id),
        }
    }

    pub fn snapshot(&self, queue: &QueueManager) -> PlaybackContext {
        match &self.active {
            ActiveContext::Queue => PlaybackContext {
                context_type: ContextType::Queue,
                ref_id: None,
                position_index: queue.current_index(),
            },
            ActiveContext::Collection {
                context_type,
                ref_id,
                position,
                ..
            } => PlaybackContext {
                context_type: *context_type,
                ref_id: ref_id.clone(),
                position_index: Some(*position),
            },
        }
    }
}

fn out_of_range(start_index: usize, len: usize) -> PlaybackError {
    PlaybackError::InvalidContext(format!(
        "start index {} out of range for {} tracks",
        start_index, len
    ))
}
