//! Playback history
//!
//! Bounded stack of tracks that were playing when the user moved on, used as
//! the "previous" fallback once the active collection has nothing earlier.

use hymn_core::{Track, TrackId};
use std::collections::VecDeque;

/// Bounded history (most recent = back)
#[derive(Debug, Clone)]
pub struct History {
    tracks: VecDeque<Track>,
    max_size: usize,
}

impl History {
    /// Create history holding at most `max_size` tracks
    pub fn new(max_size: usize) -> Self {
        Self {
            tracks: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record a track
    ///
    /// Oldest entry is discarded when full. A zero-sized history records
    /// nothing.
    pub fn push(&mut self, track: Track) {
        if self.max_size == 0 {
            return;
        }
        if self.tracks.len() >= self.max_size {
            self.tracks.pop_front();
        }
        self.tracks.push_back(track);
    }

    /// Pop most recent track
    pub fn pop(&mut self) -> Option<Track> {
        self.tracks.pop_back()
    }

    /// Most recent entry carrying `id`
    pub fn find(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().rev().find(|track| &track.id == id)
    }

    /// All tracks, oldest first
    pub fn tracks(&self) -> Vec<Track> {
        self.tracks.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}
