//! `<audio>` element backend

use crate::backend::{BackendEvent, LoadGeneration, MediaElement, TaggedEvent};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlAudioElement};

/// Receives every event the element reports
pub type EventSink = Rc<dyn Fn(TaggedEvent)>;

const LISTENED_EVENTS: [&str; 5] = ["canplay", "timeupdate", "durationchange", "ended", "error"];

/// Media element backed by a single `HTMLAudioElement`
///
/// Assigning a new `src` makes the browser drop queued events of the old
/// resource, so tagging at dispatch time with the latest generation is
/// accurate. Play-promise rejections resolve later and keep the generation
/// they were issued under.
pub struct HtmlAudioMediaElement {
    audio: HtmlAudioElement,
    generation: Rc<Cell<LoadGeneration>>,
    sink: EventSink,
    listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl HtmlAudioMediaElement {
    /// Create a detached `<audio>` element reporting into `sink`
    pub fn create(sink: EventSink) -> Result<Self, JsValue> {
        let audio = HtmlAudioElement::new()?;
        audio.set_preload("metadata");
        Ok(Self::attach(audio, sink))
    }

    /// Wrap an existing element
    pub fn attach(audio: HtmlAudioElement, sink: EventSink) -> Self {
        let generation = Rc::new(Cell::new(LoadGeneration::default()));
        let mut listeners = Vec::with_capacity(LISTENED_EVENTS.len());

        for name in LISTENED_EVENTS {
            let element = audio.clone();
            let generation = Rc::clone(&generation);
            let sink = Rc::clone(&sink);

            let callback = Closure::wrap(Box::new(move |_event: Event| {
                let event = read_event(name, &element);
                sink(TaggedEvent::new(generation.get(), event));
            }) as Box<dyn FnMut(Event)>);

            if let Err(e) = audio.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref()) {
                tracing::warn!(event = name, error = %js_error_message(&e), "Failed to attach media listener");
            }
            listeners.push((name, callback));
        }

        Self {
            audio,
            generation,
            sink,
            listeners,
        }
    }

    pub fn audio(&self) -> &HtmlAudioElement {
        &self.audio
    }
}

impl MediaElement for HtmlAudioMediaElement {
    fn set_source(&mut self, url: &str, generation: LoadGeneration) {
        self.generation.set(generation);
        self.audio.set_src(url);
        self.audio.load();
    }

    fn clear_source(&mut self) {
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
    }

    fn play(&mut self) -> Result<(), String> {
        let promise = self.audio.play().map_err(|e| js_error_message(&e))?;
        let generation = self.generation.get();
        let sink = Rc::clone(&self.sink);

        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                sink(TaggedEvent::new(generation, BackendEvent::Rejected(js_error_message(&e))));
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.audio.pause();
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.audio.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f32) {
        self.audio.set_volume(f64::from(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }
}

impl Drop for HtmlAudioMediaElement {
    fn drop(&mut self) {
        for (name, callback) in &self.listeners {
            let _ = self
                .audio
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
    }
}

fn read_event(name: &str, audio: &HtmlAudioElement) -> BackendEvent {
    match name {
        "canplay" => BackendEvent::CanPlay,
        "timeupdate" => BackendEvent::TimeUpdate(audio.current_time()),
        "durationchange" => BackendEvent::DurationChange(audio.duration()),
        "ended" => BackendEvent::Ended,
        _ => BackendEvent::Error(media_error_message(audio)),
    }
}

fn media_error_message(audio: &HtmlAudioElement) -> String {
    let Some(error) = audio.error() else {
        return "Unable to load this audio source.".to_string();
    };

    let detail = error.message();
    let summary = match error.code() {
        1 => "Playback was aborted before the audio loaded.",
        2 => "Network error while loading this track.",
        3 => "Audio playback failed due to a decode error.",
        4 => "No supported audio source was found.",
        _ => "Unable to load this audio source.",
    };

    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{} ({})", summary, detail)
    }
}

fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return format!("{}: {}", String::from(error.name()), String::from(error.message()));
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
