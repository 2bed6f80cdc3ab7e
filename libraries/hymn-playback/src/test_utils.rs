//! Test utilities
//!
//! A recording [`MediaElement`] fake plus track fixtures, shared by unit and
//! integration tests. Enabled with the `test-utils` feature.

use crate::backend::{BackendEvent, LoadGeneration, MediaElement, TaggedEvent};
use hymn_core::{SourceType, Track};
use std::cell::RefCell;
use std::rc::Rc;

/// Call made on the fake element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    SetSource { url: String, generation: LoadGeneration },
    ClearSource,
    Play,
    Pause,
    SetCurrentTime(f64),
    SetVolume(f32),
    SetMuted(bool),
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<ElementCall>,
    source: Option<String>,
    generation: LoadGeneration,
    current_time: f64,
    paused: bool,
    reject_next_play: Option<String>,
}

/// In-memory media element
///
/// Clones share state: keep one handle in the test and move another into the
/// session. Events built with [`FakeMediaElement::event`] are tagged with the
/// latest generation, like a real element would.
#[derive(Debug, Clone, Default)]
pub struct FakeMediaElement {
    state: Rc<RefCell<FakeState>>,
}

impl FakeMediaElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first
    pub fn calls(&self) -> Vec<ElementCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// URL currently assigned
    pub fn source(&self) -> Option<String> {
        self.state.borrow().source.clone()
    }

    /// Generation of the latest `set_source`
    pub fn generation(&self) -> LoadGeneration {
        self.state.borrow().generation
    }

    pub fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    /// Make the next `play` fail synchronously with `reason`
    pub fn reject_next_play(&self, reason: impl Into<String>) {
        self.state.borrow_mut().reject_next_play = Some(reason.into());
    }

    /// Event tagged with the current generation
    pub fn event(&self, event: BackendEvent) -> TaggedEvent {
        TaggedEvent::new(self.generation(), event)
    }

    /// Number of `set_source` calls so far
    pub fn load_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| matches!(call, ElementCall::SetSource { .. }))
            .count()
    }
}

impl MediaElement for FakeMediaElement {
    fn set_source(&mut self, url: &str, generation: LoadGeneration) {
        let mut state = self.state.borrow_mut();
        state.source = Some(url.to_string());
        state.generation = generation;
        state.current_time = 0.0;
        state.paused = true;
        state.calls.push(ElementCall::SetSource {
            url: url.to_string(),
            generation,
        });
    }

    fn clear_source(&mut self) {
        let mut state = self.state.borrow_mut();
        state.source = None;
        state.calls.push(ElementCall::ClearSource);
    }

    fn play(&mut self) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ElementCall::Play);
        if let Some(reason) = state.reject_next_play.take() {
            return Err(reason);
        }
        state.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        state.paused = true;
        state.calls.push(ElementCall::Pause);
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        state.current_time = seconds;
        state.calls.push(ElementCall::SetCurrentTime(seconds));
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().calls.push(ElementCall::SetVolume(volume));
    }

    fn set_muted(&mut self, muted: bool) {
        self.state.borrow_mut().calls.push(ElementCall::SetMuted(muted));
    }
}

/// Hymn track fixture with a 180 second duration
pub fn hymn(id: &str) -> Track {
    Track::new(
        id,
        format!("Hymn {}", id),
        "Test Composer",
        format!("https://media.example.org/hymns/{}.mp3", id),
        SourceType::Hymn,
    )
    .with_duration(180.0)
}

/// Bible chapter fixture
pub fn chapter(book: &str, number: u32) -> Track {
    Track::new(
        format!("{}-{}", book.to_lowercase(), number),
        format!("{} {}", book, number),
        "Narrated Bible",
        format!("https://media.example.org/bible/{}/{}.mp3", book.to_lowercase(), number),
        SourceType::Bible,
    )
    .with_duration(600.0)
}

/// Several hymn fixtures
pub fn hymns(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| hymn(id)).collect()
}
