//! Playback session - core orchestration
//!
//! Owns the single media element (through [`AudioBackendAdapter`]) and
//! coordinates queue, context, history, volume and persistence. All commands
//! and backend events are applied synchronously, one at a time; the session
//! is the only writer of [`PlaybackState`].

use crate::{
    backend::{AudioBackendAdapter, BackendEvent, MediaElement, TaggedEvent},
    config::PlaybackConfig,
    context::{ContextRequest, ContextResolver, ContextType, PlaybackContext},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    history::History,
    persistence::{PersistedSnapshot, PersistenceLayer, SnapshotStore},
    queue::{QueueManager, Removal},
    types::{Direction, EnqueuePosition, PlayTarget, PlaybackState, PlaybackStatus, QueueEntry, RepeatMode},
    volume::Volume,
};
use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender};
use hymn_core::{ResolutionError, Track, TrackId, TrackResolver};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Undrained events kept for `drain_events`; the oldest are dropped past this
const MAX_PENDING_EVENTS: usize = 512;

/// Where the previous session left off
///
/// Exposed so the UI can offer "resume"; the session never starts playing on
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePoint {
    pub track_id: TrackId,
    pub position_seconds: f64,
}

/// Everything a UI needs to render the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub repeat: RepeatMode,
    pub shuffle: bool,
    pub context: PlaybackContext,

    /// Queue in play order
    pub queue: Vec<QueueEntry>,

    /// History, oldest first
    pub history: Vec<Track>,
}

/// Single-element playback session
///
/// # Example
///
/// ```rust
/// use hymn_core::{SourceType, Track};
/// use hymn_playback::test_utils::FakeMediaElement;
/// use hymn_playback::{BackendEvent, PlaybackConfig, PlaybackSession, PlaybackStatus};
///
/// let element = FakeMediaElement::new();
/// let mut session = PlaybackSession::new(PlaybackConfig::default(), Box::new(element.clone())).unwrap();
///
/// let track = Track::new("h-1", "Amazing Grace", "John Newton", "https://media.example.org/h-1.mp3", SourceType::Hymn);
/// session.play_track(track).unwrap();
/// assert_eq!(session.state().status, PlaybackStatus::Loading);
///
/// session.handle_backend_event(element.event(BackendEvent::CanPlay));
/// assert_eq!(session.state().status, PlaybackStatus::Playing);
/// ```
pub struct PlaybackSession {
    config: PlaybackConfig,
    state: PlaybackState,
    repeat: RepeatMode,
    volume: Volume,
    adapter: AudioBackendAdapter,
    resolver: TrackResolver,
    queue: QueueManager,
    context: ContextResolver,
    history: History,
    persistence: Option<PersistenceLayer>,
    restore_point: Option<RestorePoint>,

    /// Position to apply once the current load reports `CanPlay`
    pending_seek: Option<f64>,

    /// Events not yet drained
    pending_events: VecDeque<PlaybackEvent>,
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl PlaybackSession {
    /// Create a session without persistence
    pub fn new(config: PlaybackConfig, element: Box<dyn MediaElement>) -> Result<Self> {
        config.validate()?;

        let resolver = match config.media_base_url.as_deref() {
            Some(base) => TrackResolver::with_base_url(base)?,
            None => TrackResolver::new(),
        };

        let mut adapter = AudioBackendAdapter::new(element);
        let volume = Volume::new(config.volume);
        adapter.set_volume(volume.level());

        let state = PlaybackState {
            volume: volume.level(),
            ..PlaybackState::default()
        };

        Ok(Self {
            history: History::new(config.history_size),
            repeat: config.repeat,
            config,
            state,
            volume,
            adapter,
            resolver,
            queue: QueueManager::new(),
            context: ContextResolver::new(),
            persistence: None,
            restore_point: None,
            pending_seek: None,
            pending_events: VecDeque::new(),
            subscribers: Vec::new(),
        })
    }

    /// Create a session backed by `store`
    ///
    /// The stored snapshot is read once: volume and mute are applied, the
    /// last track becomes the [`RestorePoint`]. A missing or unreadable
    /// snapshot starts fresh.
    pub fn with_persistence(
        config: PlaybackConfig,
        element: Box<dyn MediaElement>,
        store: Box<dyn SnapshotStore>,
    ) -> Result<Self> {
        let mut session = Self::new(config, element)?;
        let mut layer = PersistenceLayer::new(store, session.config.persist_debounce());

        if let Some(snapshot) = layer.restore() {
            session.apply_restored(&snapshot);
        }
        session.persistence = Some(layer);
        Ok(session)
    }

    fn apply_restored(&mut self, snapshot: &PersistedSnapshot) {
        let level = self.volume.set_level(snapshot.volume);
        self.volume.set_muted(snapshot.is_muted);
        self.adapter.set_volume(level);
        self.adapter.set_muted(snapshot.is_muted);
        self.state.volume = level;
        self.state.is_muted = snapshot.is_muted;

        self.restore_point = snapshot.last_track_id.clone().map(|track_id| RestorePoint {
            track_id,
            position_seconds: if snapshot.last_position_seconds.is_finite() {
                snapshot.last_position_seconds.max(0.0)
            } else {
                0.0
            },
        });

        info!(
            volume = level,
            muted = snapshot.is_muted,
            restore_track = ?self.restore_point.as_ref().map(|p| p.track_id.as_str()),
            "Restored playback snapshot"
        );
    }

    // ===== Transport =====

    /// Load and start `target`
    ///
    /// Resolution happens first; on failure nothing changes. The previously
    /// playing track is pushed onto history. If the active context contains
    /// the track its position follows.
    pub fn play_track(&mut self, target: impl Into<PlayTarget>) -> Result<()> {
        let track = self.resolve_target(target.into())?;
        self.context.select(&track.id, &mut self.queue);

        info!(track_id = %track.id, title = %track.title, "Playing track");
        self.start_track(track, true);
        Ok(())
    }

    /// Resume the previous session's track at its saved position
    ///
    /// `target` must resolve to the restore point's track; anything else is
    /// simply played from the start. The position is applied once the new
    /// load reports `CanPlay`.
    pub fn resume(&mut self, target: impl Into<PlayTarget>) -> Result<()> {
        let point = self.restore_point.clone();
        self.play_track(target)?;
        self.restore_point = None;

        if let Some(point) = point {
            let matches = self
                .state
                .current_track
                .as_ref()
                .is_some_and(|track| track.id == point.track_id);
            if matches && point.position_seconds > 0.0 {
                self.pending_seek = Some(point.position_seconds);
            }
        }
        Ok(())
    }

    /// Resume after pause, or replay after `Ended`/`Error`
    ///
    /// No-op while idle, loading or already playing.
    pub fn play(&mut self) {
        match self.state.status {
            PlaybackStatus::Paused => match self.adapter.play() {
                Ok(()) => {
                    self.set_status(PlaybackStatus::Playing);
                    self.mark_dirty();
                }
                Err(e) => self.fail(e),
            },
            PlaybackStatus::Ended | PlaybackStatus::Error => {
                if let Some(track) = self.state.current_track.clone() {
                    self.start_track(track, false);
                }
            }
            PlaybackStatus::Idle | PlaybackStatus::Loading | PlaybackStatus::Playing => {}
        }
    }

    /// Pause playback; only a playing session can pause
    pub fn pause(&mut self) {
        if self.state.status == PlaybackStatus::Playing {
            self.adapter.pause();
            self.set_status(PlaybackStatus::Paused);
            self.mark_dirty();
        }
    }

    /// Stop and release the current track
    pub fn stop(&mut self) {
        if self.state.status == PlaybackStatus::Idle {
            return;
        }
        self.adapter.unload();
        self.pending_seek = None;
        self.state.current_track = None;
        self.state.current_time_seconds = 0.0;
        self.state.duration_seconds = 0.0;
        self.state.last_error = None;
        self.set_status(PlaybackStatus::Idle);
        self.mark_dirty();
    }

    /// Seek within the current track
    ///
    /// Only while playing or paused; otherwise ignored and the current
    /// position is returned. Clamped to `[0, duration]` (no upper bound
    /// while the duration is unknown). Returns the applied position.
    pub fn seek(&mut self, seconds: f64) -> f64 {
        if !matches!(self.state.status, PlaybackStatus::Playing | PlaybackStatus::Paused) {
            debug!(status = ?self.state.status, "Ignoring seek");
            return self.state.current_time_seconds;
        }

        let applied = self.adapter.seek(seconds);
        self.state.current_time_seconds = applied;
        self.emit(PlaybackEvent::PositionUpdate {
            position_seconds: applied,
        });
        self.mark_dirty();
        applied
    }

    /// Move through the active context
    ///
    /// `Next` ignores repeat-one. `Previous` restarts the current track when
    /// more than the restart threshold in, otherwise steps back in the
    /// context and then falls back to history.
    pub fn skip(&mut self, direction: Direction) {
        match direction {
            Direction::Next => self.advance(self.repeat.for_manual_skip()),
            Direction::Previous => self.go_back(),
        }
    }

    fn advance(&mut self, repeat: RepeatMode) {
        match self.context.advance(Direction::Next, repeat, &mut self.queue) {
            Some(track) => self.start_track(track, true),
            None => self.finish(),
        }
    }

    fn go_back(&mut self) {
        let mid_track = matches!(self.state.status, PlaybackStatus::Playing | PlaybackStatus::Paused)
            && self.state.current_time_seconds > self.config.restart_threshold_secs;
        if mid_track {
            debug!("Restarting current track instead of going back");
            self.seek(0.0);
            return;
        }

        let previous = self
            .context
            .advance(Direction::Previous, self.repeat, &mut self.queue)
            .or_else(|| self.history.pop());

        match previous {
            Some(track) => self.start_track(track, false),
            None => {
                if self.state.current_track.is_some() {
                    self.seek(0.0);
                }
            }
        }
    }

    // ===== Volume =====

    /// Set volume (clamped to 0.0-1.0)
    pub fn set_volume(&mut self, volume: f32) {
        let level = self.volume.set_level(volume);
        self.adapter.set_volume(level);
        self.volume_changed();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.adapter.set_muted(muted);
        self.volume_changed();
    }

    pub fn toggle_mute(&mut self) {
        let muted = self.volume.toggle_mute();
        self.adapter.set_muted(muted);
        self.volume_changed();
    }

    fn volume_changed(&mut self) {
        self.state.volume = self.volume.level();
        self.state.is_muted = self.volume.is_muted();
        self.emit(PlaybackEvent::VolumeChanged {
            volume: self.state.volume,
            is_muted: self.state.is_muted,
        });
        self.mark_dirty();
    }

    // ===== Modes & context =====

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        debug!(repeat = %mode, "Repeat mode changed");
        self.repeat = mode;
    }

    /// Shuffle the queue (the playing entry stays first)
    pub fn set_shuffle(&mut self, enabled: bool) {
        self.queue.shuffle(enabled, &mut rand::thread_rng());
        debug!(enabled, "Shuffle changed");
        self.emit_queue_changed();
    }

    /// Switch the active context
    ///
    /// Rejected requests change nothing. Does not start playback; returns
    /// the track at the start position so the caller can play it.
    pub fn set_playback_context(&mut self, request: ContextRequest) -> Result<Option<Track>> {
        let replaces_queue = request.context_type == ContextType::Queue && !request.tracks.is_empty();

        let start = self
            .context
            .set_context(request, &mut self.queue, &mut rand::thread_rng())?;

        if replaces_queue {
            self.emit_queue_changed();
        }
        let context = self.context.snapshot(&self.queue);
        info!(
            context_type = %context.context_type,
            ref_id = ?context.ref_id,
            position = ?context.position_index,
            "Playback context changed"
        );
        self.emit(PlaybackEvent::ContextChanged { context });
        Ok(start)
    }

    // ===== Queue =====

    pub fn enqueue(&mut self, target: impl Into<PlayTarget>, position: EnqueuePosition) -> Result<()> {
        let track = self.resolve_target(target.into())?;
        debug!(track_id = %track.id, ?position, "Enqueue");
        self.queue.enqueue(track, position);
        self.emit_queue_changed();
        Ok(())
    }

    /// Remove a queued track
    ///
    /// Removing the entry that is playing in the queue context advances to
    /// its successor, or ends playback when there is none.
    pub fn remove_from_queue(&mut self, track_id: &TrackId) -> Result<()> {
        let playing_from_queue = self.context.context_type() == ContextType::Queue;

        match self.queue.remove(track_id, self.repeat) {
            Removal::NotFound => Err(PlaybackError::TrackNotFound(track_id.to_string())),
            Removal::Removed(_) => {
                self.emit_queue_changed();
                Ok(())
            }
            Removal::RemovedCurrent { entry, successor } => {
                self.emit_queue_changed();

                let is_audible = self
                    .state
                    .current_track
                    .as_ref()
                    .is_some_and(|track| track.id == entry.track.id);
                if playing_from_queue && is_audible {
                    match successor {
                        Some(track) => self.start_track(track, true),
                        None => self.finish(),
                    }
                }
                Ok(())
            }
        }
    }

    pub fn reorder_queue(&mut self, from: usize, to: usize) -> Result<()> {
        self.queue.reorder(from, to)?;
        self.emit_queue_changed();
        Ok(())
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.emit_queue_changed();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ===== Backend events =====

    /// Apply an event reported by the media element
    ///
    /// Events from superseded loads are ignored.
    pub fn handle_backend_event(&mut self, tagged: TaggedEvent) {
        let Some(event) = self.adapter.accept(tagged) else {
            return;
        };

        match event {
            BackendEvent::CanPlay => {
                if self.state.status == PlaybackStatus::Loading {
                    self.set_status(PlaybackStatus::Playing);
                    if let Some(position) = self.pending_seek.take() {
                        self.seek(position);
                    }
                }
            }
            BackendEvent::TimeUpdate(seconds) => {
                self.state.current_time_seconds = seconds;
                self.emit(PlaybackEvent::PositionUpdate {
                    position_seconds: seconds,
                });
                self.mark_dirty();
            }
            BackendEvent::DurationChange(seconds) => {
                self.state.duration_seconds = seconds;
                self.emit(PlaybackEvent::DurationChanged {
                    duration_seconds: seconds,
                });
            }
            BackendEvent::Ended => self.on_track_ended(),
            BackendEvent::Error(reason) => self.fail(PlaybackError::BackendPlayback(reason)),
            BackendEvent::Rejected(reason) => self.fail(PlaybackError::BackendRejected(reason)),
        }
    }

    fn on_track_ended(&mut self) {
        let Some(track_id) = self.state.current_track.as_ref().map(|t| t.id.clone()) else {
            return;
        };
        debug!(%track_id, repeat = %self.repeat, "Track ended");
        self.emit(PlaybackEvent::TrackFinished {
            track_id: track_id.clone(),
        });

        if self.repeat == RepeatMode::One {
            self.state.current_time_seconds = 0.0;
            match self.adapter.restart() {
                Ok(()) => {
                    self.emit(PlaybackEvent::TrackChanged {
                        track_id: track_id.clone(),
                        previous_track_id: Some(track_id),
                    });
                    self.set_status(PlaybackStatus::Playing);
                }
                Err(e) => self.fail(e),
            }
            return;
        }

        self.advance(self.repeat);
    }

    // ===== Persistence =====

    /// Write the snapshot if the debounce interval has elapsed
    ///
    /// Call periodically (e.g. from a UI timer) with the current time.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let due = self.persistence.as_ref().is_some_and(|layer| layer.is_due(now));
        if due {
            self.flush_persistence();
        }
    }

    /// Write the snapshot now
    pub fn flush_persistence(&mut self) {
        let snapshot = self.persisted_snapshot();
        if let Some(layer) = self.persistence.as_mut() {
            layer.flush(snapshot);
        }
    }

    /// Snapshot as it would be persisted
    pub fn persisted_snapshot(&self) -> PersistedSnapshot {
        let (last_track_id, last_position_seconds) = match &self.state.current_track {
            Some(track) => (Some(track.id.clone()), self.state.current_time_seconds),
            None => match &self.restore_point {
                Some(point) => (Some(point.track_id.clone()), point.position_seconds),
                None => (None, 0.0),
            },
        };

        PersistedSnapshot {
            last_track_id,
            last_position_seconds,
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
        }
    }

    /// Release the media element and write any pending snapshot
    pub fn shutdown(mut self) {
        info!("Shutting down playback session");
        self.adapter.unload();
        if self.persistence.as_ref().is_some_and(PersistenceLayer::is_dirty) {
            self.flush_persistence();
        }
        self.subscribers.clear();
    }

    // ===== Observation =====

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state.clone(),
            repeat: self.repeat,
            shuffle: self.queue.is_shuffled(),
            context: self.context.snapshot(&self.queue),
            queue: self.queue.entries(),
            history: self.history.tracks(),
        }
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn is_shuffled(&self) -> bool {
        self.queue.is_shuffled()
    }

    pub fn context(&self) -> PlaybackContext {
        self.context.snapshot(&self.queue)
    }

    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn restore_point(&self) -> Option<&RestorePoint> {
        self.restore_point.as_ref()
    }

    pub fn resolver(&self) -> &TrackResolver {
        &self.resolver
    }

    /// Take all pending events
    ///
    /// Only the most recent events are kept between drains.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.pending_events.drain(..).collect()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    /// Receive every future event on a channel
    ///
    /// Dropped receivers are pruned on the next emit.
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    // ===== Internals =====

    fn resolve_target(&self, target: PlayTarget) -> Result<Track> {
        match target {
            PlayTarget::Track(track) => {
                if track.audio_url.trim().is_empty() {
                    return Err(ResolutionError::missing_audio_url(track.id.as_str()).into());
                }
                Ok(track)
            }
            PlayTarget::Record(record) => Ok(self.resolver.resolve(&record)?),
            PlayTarget::Id(id) => self
                .context
                .find(&id, &self.queue)
                .or_else(|| self.queue.find(&id))
                .or_else(|| self.history.find(&id))
                .or_else(|| self.state.current_track.as_ref().filter(|track| track.id == id))
                .cloned()
                .ok_or_else(|| PlaybackError::TrackNotFound(id.to_string())),
        }
    }

    /// Assign `track` to the element and request playback
    fn start_track(&mut self, track: Track, record_history: bool) {
        let previous = self.state.current_track.take();
        let previous_track_id = previous.as_ref().map(|t| t.id.clone());

        if record_history {
            if let Some(previous) = previous.filter(|p| p.id != track.id) {
                self.history.push(previous);
            }
        }

        self.pending_seek = None;
        let duration_hint = (track.duration_seconds > 0.0).then_some(track.duration_seconds);
        self.adapter.load(&track.audio_url, duration_hint);

        self.state.current_time_seconds = 0.0;
        self.state.duration_seconds = track.duration_seconds;
        self.state.last_error = None;
        let track_id = track.id.clone();
        self.state.current_track = Some(track);

        self.set_status(PlaybackStatus::Loading);
        self.emit(PlaybackEvent::TrackChanged {
            track_id,
            previous_track_id,
        });

        if let Err(e) = self.adapter.play() {
            self.fail(e);
        }
        self.mark_dirty();
    }

    /// Nothing left to play
    fn finish(&mut self) {
        if self.state.current_track.is_none() {
            return;
        }
        self.adapter.pause();
        self.set_status(PlaybackStatus::Ended);
        self.mark_dirty();
    }

    /// Capture a backend failure into state; no automatic retry
    fn fail(&mut self, error: PlaybackError) {
        let message = error.to_string();
        warn!(
            error = %message,
            track_id = ?self.state.current_track.as_ref().map(|t| t.id.as_str()),
            "Playback failed"
        );

        self.adapter.pause();
        self.state.last_error = Some(message.clone());
        self.set_status(PlaybackStatus::Error);
        self.emit(PlaybackEvent::Error { message });
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.state.status == status {
            return;
        }
        debug!(from = ?self.state.status, to = ?status, "Status changed");
        self.state.status = status;
        self.emit(PlaybackEvent::StateChanged { status });
    }

    fn emit_queue_changed(&mut self) {
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if self.pending_events.len() >= MAX_PENDING_EVENTS {
            self.pending_events.pop_front();
        }
        self.pending_events.push_back(event);
    }

    fn mark_dirty(&mut self) {
        if let Some(layer) = self.persistence.as_mut() {
            layer.mark_dirty(Utc::now());
        }
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("state", &self.state)
            .field("repeat", &self.repeat)
            .field("adapter", &self.adapter)
            .field("queue_len", &self.queue.len())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}
