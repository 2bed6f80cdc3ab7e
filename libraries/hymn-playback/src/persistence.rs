//! Session snapshot persistence
//!
//! A small snapshot (`lastTrackId`, `lastPositionSeconds`, `volume`,
//! `isMuted`) is written best-effort so a reload can restore volume and
//! offer "resume". Writes are throttled: after the first change in a quiet
//! period, one write happens once the debounce interval has elapsed.

use crate::error::PersistenceError;
use chrono::{DateTime, Utc};
use hymn_core::TrackId;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, warn};

/// Persisted session snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub last_track_id: Option<TrackId>,

    #[serde(default)]
    pub last_position_seconds: f64,

    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default)]
    pub is_muted: bool,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            last_track_id: None,
            last_position_seconds: 0.0,
            volume: default_volume(),
            is_muted: false,
        }
    }
}

fn default_volume() -> f32 {
    0.8
}

/// Where snapshots are kept
pub trait SnapshotStore {
    /// Previously saved snapshot, `None` if nothing was ever saved
    fn load(&self) -> Result<Option<PersistedSnapshot>, PersistenceError>;

    fn save(&mut self, snapshot: &PersistedSnapshot) -> Result<(), PersistenceError>;
}

/// JSON file on disk
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a crash mid-write never leaves a truncated snapshot behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedSnapshot>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, snapshot: &PersistedSnapshot) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store
///
/// Clones share the same slot, so a test can keep a handle after moving the
/// store into a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<PersistedSnapshot>>>,
    saves: Rc<RefCell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `snapshot`
    pub fn with_snapshot(snapshot: PersistedSnapshot) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(snapshot);
        store
    }

    pub fn snapshot(&self) -> Option<PersistedSnapshot> {
        self.slot.borrow().clone()
    }

    /// Number of completed saves
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<PersistedSnapshot>, PersistenceError> {
        Ok(self.snapshot())
    }

    fn save(&mut self, snapshot: &PersistedSnapshot) -> Result<(), PersistenceError> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// Throttled, best-effort writer in front of a [`SnapshotStore`]
pub struct PersistenceLayer {
    store: Box<dyn SnapshotStore>,
    debounce: Duration,
    dirty_since: Option<DateTime<Utc>>,
    last_saved: Option<PersistedSnapshot>,
}

impl PersistenceLayer {
    pub fn new(store: Box<dyn SnapshotStore>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            dirty_since: None,
            last_saved: None,
        }
    }

    /// Read the stored snapshot; failures are logged and treated as absent
    pub fn restore(&mut self) -> Option<PersistedSnapshot> {
        match self.store.load() {
            Ok(snapshot) => {
                self.last_saved.clone_from(&snapshot);
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Failed to read playback snapshot, starting fresh");
                None
            }
        }
    }

    /// Note a state change at `now`
    pub fn mark_dirty(&mut self, now: DateTime<Utc>) {
        if self.dirty_since.is_none() {
            self.dirty_since = Some(now);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Whether a pending write should happen at `now`
    ///
    /// A clock that moved backwards counts as due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.dirty_since.is_some_and(|since| {
            (now - since)
                .to_std()
                .map_or(true, |elapsed| elapsed >= self.debounce)
        })
    }

    /// Write `snapshot` unless it matches what was last written
    ///
    /// Store errors are logged; playback never fails because of them.
    pub fn flush(&mut self, snapshot: PersistedSnapshot) {
        self.dirty_since = None;

        if self.last_saved.as_ref() == Some(&snapshot) {
            return;
        }

        match self.store.save(&snapshot) {
            Ok(()) => {
                debug!(track_id = ?snapshot.last_track_id, "Saved playback snapshot");
                self.last_saved = Some(snapshot);
            }
            Err(e) => warn!(error = %e, "Failed to save playback snapshot"),
        }
    }
}

impl std::fmt::Debug for PersistenceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceLayer")
            .field("debounce", &self.debounce)
            .field("dirty_since", &self.dirty_since)
            .finish_non_exhaustive()
    }
}
