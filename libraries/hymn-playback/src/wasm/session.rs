//! WASM-compatible PlaybackSession wrapper

use super::element::{EventSink, HtmlAudioMediaElement};
use super::storage::LocalStorageStore;
use crate::{
    ContextRequest, Direction, EnqueuePosition, PlayTarget, PlaybackConfig, PlaybackError, PlaybackEvent,
    PlaybackSession, RepeatMode, TaggedEvent,
};
use chrono::Utc;
use hymn_core::{Track, TrackId, TrackRecord};
use js_sys::Function;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;

/// State shared between the wrapper and the element's event listeners
struct Shared {
    session: RefCell<Option<PlaybackSession>>,
    on_event: RefCell<Option<Function>>,
}

impl Shared {
    /// Run `f` against the session, then deliver the events it produced
    ///
    /// Callbacks run after the borrow is released so they may call back in.
    fn with_session<T>(&self, f: impl FnOnce(&mut PlaybackSession) -> T) -> Option<T> {
        let (result, events) = {
            let Ok(mut slot) = self.session.try_borrow_mut() else {
                tracing::warn!("Playback session busy, dropping re-entrant call");
                return None;
            };
            let Some(session) = slot.as_mut() else {
                tracing::debug!("Playback session already shut down");
                return None;
            };
            let result = f(session);
            (result, session.drain_events())
        };
        self.deliver(events);
        Some(result)
    }

    fn deliver(&self, events: Vec<PlaybackEvent>) {
        let Some(callback) = self.on_event.borrow().clone() else {
            return;
        };
        for event in events {
            match serde_wasm_bindgen::to_value(&event) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        tracing::warn!(event = event.name(), error = ?e, "Event callback threw");
                    }
                }
                Err(e) => tracing::warn!(event = event.name(), error = %e, "Failed to serialize event"),
            }
        }
    }
}

/// WASM-compatible playback session
///
/// Owns one `<audio>` element and persists to `localStorage`.
#[wasm_bindgen]
pub struct WasmPlaybackSession {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl WasmPlaybackSession {
    /// Create a session; `config` is an optional `PlaybackConfig` object
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmPlaybackSession, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlaybackConfig = if config.is_undefined() || config.is_null() {
            PlaybackConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let shared = Rc::new(Shared {
            session: RefCell::new(None),
            on_event: RefCell::new(None),
        });

        let weak: Weak<Shared> = Rc::downgrade(&shared);
        let sink: EventSink = Rc::new(move |event: TaggedEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.with_session(|session| {
                    session.handle_backend_event(event);
                    session.tick(Utc::now());
                });
            }
        });

        let element = HtmlAudioMediaElement::create(sink)?;
        let session = PlaybackSession::with_persistence(
            config,
            Box::new(element),
            Box::new(LocalStorageStore::default()),
        )
        .map_err(to_js)?;
        shared.session.replace(Some(session));

        Ok(Self { shared })
    }

    /// Register the event callback (receives one serialized `PlaybackEvent`)
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: Function) {
        self.shared.on_event.replace(Some(callback));
    }

    // ===== Playback Control =====

    /// Play a resolved track object
    #[wasm_bindgen(js_name = playTrack)]
    pub fn play_track(&self, track: JsValue) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)?;
        self.command(|s| s.play_track(track))
    }

    /// Resolve and play a catalog record (`{ kind: "hymn", ... }`)
    #[wasm_bindgen(js_name = playRecord)]
    pub fn play_record(&self, record: JsValue) -> Result<(), JsValue> {
        let record: TrackRecord = serde_wasm_bindgen::from_value(record)?;
        self.command(|s| s.play_track(record))
    }

    /// Play a track already known to the session by id
    #[wasm_bindgen(js_name = playId)]
    pub fn play_id(&self, id: String) -> Result<(), JsValue> {
        self.command(|s| s.play_track(TrackId::new(id)))
    }

    /// Resume the restore point using `record` as its source
    pub fn resume(&self, record: JsValue) -> Result<(), JsValue> {
        let record: TrackRecord = serde_wasm_bindgen::from_value(record)?;
        self.command(|s| s.resume(PlayTarget::Record(record)))
    }

    pub fn play(&self) {
        self.shared.with_session(PlaybackSession::play);
    }

    pub fn pause(&self) {
        self.shared.with_session(PlaybackSession::pause);
    }

    pub fn stop(&self) {
        self.shared.with_session(PlaybackSession::stop);
    }

    /// Seek to position in seconds, returning the applied position
    pub fn seek(&self, seconds: f64) -> f64 {
        self.shared.with_session(|s| s.seek(seconds)).unwrap_or(0.0)
    }

    /// Skip by `step` (+1 next, -1 previous)
    pub fn skip(&self, step: i32) {
        if let Some(direction) = Direction::from_step(step) {
            self.shared.with_session(|s| s.skip(direction));
        }
    }

    // ===== Volume Control =====

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f32) {
        self.shared.with_session(|s| s.set_volume(volume));
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) {
        self.shared.with_session(|s| s.set_muted(muted));
    }

    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) {
        self.shared.with_session(PlaybackSession::toggle_mute);
    }

    // ===== Modes & Context =====

    /// Set repeat mode ("off" | "one" | "all")
    #[wasm_bindgen(js_name = setRepeat)]
    pub fn set_repeat(&self, mode: &str) -> Result<(), JsValue> {
        let mode = RepeatMode::from_str(mode).ok_or_else(|| JsValue::from_str(&format!("Unknown repeat mode: {}", mode)))?;
        self.shared.with_session(|s| s.set_repeat(mode));
        Ok(())
    }

    #[wasm_bindgen(js_name = setShuffle)]
    pub fn set_shuffle(&self, enabled: bool) {
        self.shared.with_session(|s| s.set_shuffle(enabled));
    }

    /// Switch context (`{ type, refId, tracks, startIndex }`); returns the
    /// start track or `null`
    #[wasm_bindgen(js_name = setPlaybackContext)]
    pub fn set_playback_context(&self, request: JsValue) -> Result<JsValue, JsValue> {
        let request: ContextRequest = serde_wasm_bindgen::from_value(request)?;
        let start = self
            .shared
            .with_session(|s| s.set_playback_context(request))
            .ok_or_else(busy)?
            .map_err(to_js)?;
        Ok(serde_wasm_bindgen::to_value(&start)?)
    }

    // ===== Queue Management =====

    /// Add a resolved track to the queue (at the end, or next when `next`)
    pub fn enqueue(&self, track: JsValue, next: bool) -> Result<(), JsValue> {
        let track: Track = serde_wasm_bindgen::from_value(track)?;
        let position = if next { EnqueuePosition::Next } else { EnqueuePosition::End };
        self.command(|s| s.enqueue(track, position))
    }

    #[wasm_bindgen(js_name = removeFromQueue)]
    pub fn remove_from_queue(&self, id: String) -> Result<(), JsValue> {
        self.command(|s| s.remove_from_queue(&TrackId::new(id)))
    }

    #[wasm_bindgen(js_name = reorderQueue)]
    pub fn reorder_queue(&self, from: usize, to: usize) -> Result<(), JsValue> {
        self.command(|s| s.reorder_queue(from, to))
    }

    #[wasm_bindgen(js_name = clearQueue)]
    pub fn clear_queue(&self) {
        self.shared.with_session(PlaybackSession::clear_queue);
    }

    // ===== State =====

    /// Full `PlaybackSnapshot` as a plain object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.shared.with_session(|s| s.snapshot()).ok_or_else(busy)?;
        Ok(serde_wasm_bindgen::to_value(&snapshot)?)
    }

    /// Previous session's last track and position, or `null`
    #[wasm_bindgen(js_name = restorePoint)]
    pub fn restore_point(&self) -> Result<JsValue, JsValue> {
        let point = self
            .shared
            .with_session(|s| s.restore_point().cloned())
            .ok_or_else(busy)?;
        Ok(serde_wasm_bindgen::to_value(&point)?)
    }

    /// Flush pending persistence if due; call from a timer
    pub fn tick(&self) {
        self.shared.with_session(|s| s.tick(Utc::now()));
    }

    /// Release the audio element and write the final snapshot
    pub fn shutdown(&self) {
        let session = self.shared.session.borrow_mut().take();
        if let Some(session) = session {
            session.shutdown();
        }
        self.shared.on_event.replace(None);
    }

    fn command(&self, f: impl FnOnce(&mut PlaybackSession) -> crate::Result<()>) -> Result<(), JsValue> {
        self.shared.with_session(f).ok_or_else(busy)?.map_err(to_js)
    }
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn busy() -> JsValue {
    JsValue::from_str("Playback session is unavailable")
}
