//! User play queue
//!
//! Ordered entries plus the index of the one currently playing. Shuffling
//! only swaps in a permutation of indices on top of the original sequence:
//!
//! ```text
//! entries:  [A, B, C, D]        current = 1 (B)
//! shuffled: Some([1, 3, 0, 2])  effective order B, D, A, C
//! ```
//!
//! Every mutation keeps `current` pointing at the same entry it did before,
//! so removing or reordering around the playing entry never changes what
//! "next" means.

use crate::error::{PlaybackError, Result};
use crate::shuffle::shuffled_order;
use crate::types::{EnqueuePosition, QueueEntry, RepeatMode};
use hymn_core::{Track, TrackId};
use rand::Rng;

/// Outcome of [`QueueManager::remove`]
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// No entry carries that id
    NotFound,

    /// A non-playing entry was removed
    Removed(QueueEntry),

    /// The playing entry was removed; `successor` is now current
    RemovedCurrent {
        entry: QueueEntry,
        successor: Option<Track>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct QueueManager {
    entries: Vec<QueueEntry>,

    /// Effective play order when shuffled (indices into `entries`)
    shuffled: Option<Vec<usize>>,

    /// Index into `entries` of the playing entry
    current: Option<usize>,
}

impl QueueManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a track
    ///
    /// `Next` inserts right after the playing entry in both the original and
    /// the shuffled order; with nothing playing it goes to the front.
    /// Returns the index of the new entry in the original sequence.
    pub fn enqueue(&mut self, track: Track, position: EnqueuePosition) -> usize {
        let entry = QueueEntry::new(track);

        match position {
            EnqueuePosition::End => {
                let index = self.entries.len();
                self.entries.push(entry);
                if let Some(order) = self.shuffled.as_mut() {
                    order.push(index);
                }
                index
            }
            EnqueuePosition::Next => {
                let index = self.current.map_or(0, |current| current + 1);
                let insert_at = self.current.and_then(|c| self.order_position(c)).map_or(0, |p| p + 1);

                self.entries.insert(index, entry);
                if let Some(order) = self.shuffled.as_mut() {
                    for i in order.iter_mut() {
                        if *i >= index {
                            *i += 1;
                        }
                    }
                    order.insert(insert_at, index);
                }
                index
            }
        }
    }

    /// Replace the whole queue with `tracks`, marking `current` as playing
    ///
    /// A shuffled queue stays shuffled with the new current entry first.
    pub fn replace<R: Rng + ?Sized>(&mut self, tracks: Vec<Track>, current: Option<usize>, rng: &mut R) {
        self.entries = tracks.into_iter().map(QueueEntry::new).collect();
        self.current = current.filter(|&index| index < self.entries.len());
        if self.shuffled.is_some() {
            self.shuffled = Some(shuffled_order(self.entries.len(), self.current, rng));
        }
    }

    /// Remove the entry carrying `id`
    ///
    /// The playing entry wins when several entries share the id, otherwise
    /// the first match in the original sequence is removed. Removing the
    /// playing entry moves `current` to its successor under `repeat`.
    pub fn remove(&mut self, id: &TrackId, repeat: RepeatMode) -> Removal {
        let playing_matches = self.current_track().is_some_and(|track| &track.id == id);
        let index = if playing_matches {
            self.current
        } else {
            self.entries.iter().position(|entry| &entry.track.id == id)
        };
        let Some(index) = index else {
            return Removal::NotFound;
        };

        if self.current == Some(index) {
            let successor = self.next_index(repeat.for_manual_skip()).filter(|&next| next != index);
            let entry = self.remove_at(index);
            self.current = successor.map(|next| if next > index { next - 1 } else { next });
            return Removal::RemovedCurrent {
                entry,
                successor: self.current_track().cloned(),
            };
        }

        let entry = self.remove_at(index);
        if let Some(current) = self.current {
            if index < current {
                self.current = Some(current - 1);
            }
        }
        Removal::Removed(entry)
    }

    fn remove_at(&mut self, index: usize) -> QueueEntry {
        let entry = self.entries.remove(index);
        if let Some(order) = self.shuffled.as_mut() {
            order.retain(|&i| i != index);
            for i in order.iter_mut() {
                if *i > index {
                    *i -= 1;
                }
            }
        }
        entry
    }

    /// Move the entry at `from` to `to` (original sequence indices)
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.entries.len();
        if from >= len || to >= len {
            return Err(PlaybackError::QueueInvariant(format!(
                "reorder {} -> {} out of bounds for queue of {}",
                from, to, len
            )));
        }
        if from == to {
            return Ok(());
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);

        let remap = |index: usize| -> usize {
            if index == from {
                to
            } else if from < to && index > from && index <= to {
                index - 1
            } else if to < from && index >= to && index < from {
                index + 1
            } else {
                index
            }
        };

        self.current = self.current.map(remap);
        if let Some(order) = self.shuffled.as_mut() {
            for i in order.iter_mut() {
                *i = remap(*i);
            }
        }
        Ok(())
    }

    /// Enable or disable shuffle
    ///
    /// Enabling (or re-enabling) draws a fresh permutation with the playing
    /// entry first. Disabling returns to the original order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, enable: bool, rng: &mut R) {
        self.shuffled = enable.then(|| shuffled_order(self.entries.len(), self.current, rng));
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffled.is_some()
    }

    /// Drop every entry; shuffle mode is kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
        if self.shuffled.is_some() {
            self.shuffled = Some(Vec::new());
        }
    }

    /// Index (original sequence) of the entry that would play next
    pub fn next_index(&self, repeat: RepeatMode) -> Option<usize> {
        let order = self.order();
        let first = *order.first()?;

        let Some(current) = self.current else {
            return Some(first);
        };
        if repeat == RepeatMode::One {
            return Some(current);
        }

        let position = self.order_position(current)?;
        match order.get(position + 1) {
            Some(&next) => Some(next),
            None if repeat == RepeatMode::All => Some(first),
            None => None,
        }
    }

    /// Index of the entry before the playing one; never wraps
    pub fn previous_index(&self) -> Option<usize> {
        let position = self.order_position(self.current?)?;
        let previous = position.checked_sub(1)?;
        self.order().get(previous).copied()
    }

    /// Track that would play next, without moving
    pub fn peek_next(&self, repeat: RepeatMode) -> Option<&Track> {
        self.next_index(repeat)
            .and_then(|index| self.entries.get(index))
            .map(|entry| &entry.track)
    }

    /// Move to the next entry
    pub fn advance(&mut self, repeat: RepeatMode) -> Option<Track> {
        let next = self.next_index(repeat)?;
        self.current = Some(next);
        self.current_track().cloned()
    }

    /// Move to the previous entry
    pub fn retreat(&mut self) -> Option<Track> {
        let previous = self.previous_index()?;
        self.current = Some(previous);
        self.current_track().cloned()
    }

    /// Mark the entry carrying `id` as playing
    ///
    /// Keeps the current entry if it already carries `id`.
    pub fn select(&mut self, id: &TrackId) -> Option<usize> {
        if self.current_track().is_some_and(|track| &track.id == id) {
            return self.current;
        }
        let index = self.entries.iter().position(|entry| &entry.track.id == id)?;
        self.current = Some(index);
        Some(index)
    }

    /// Mark the entry at `index` (original sequence) as playing
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        if index >= self.entries.len() {
            return Err(PlaybackError::QueueInvariant(format!(
                "index {} out of bounds for queue of {}",
                index,
                self.entries.len()
            )));
        }
        self.current = Some(index);
        Ok(())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|index| self.entries.get(index)).map(|entry| &entry.track)
    }

    /// First entry carrying `id`
    pub fn find(&self, id: &TrackId) -> Option<&Track> {
        self.entries
            .iter()
            .map(|entry| &entry.track)
            .find(|track| &track.id == id)
    }

    /// Entries in original order
    pub fn sequence(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Entries in play order (shuffled when shuffle is on)
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.order()
            .into_iter()
            .filter_map(|index| self.entries.get(index).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn order(&self) -> Vec<usize> {
        match &self.shuffled {
            Some(order) => order.clone(),
            None => (0..self.entries.len()).collect(),
        }
    }

    fn order_position(&self, index: usize) -> Option<usize> {
        match &self.shuffled {
            Some(order) => order.iter().position(|&i| i == index),
            None => (index < self.entries.len()).then_some(index),
        }
    }
}
