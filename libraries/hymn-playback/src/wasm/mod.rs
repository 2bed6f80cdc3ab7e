//! WASM bindings for hymn-playback
//!
//! Browser implementations of the platform seams (an `<audio>` element and
//! `localStorage` snapshots) plus a JavaScript-facing session wrapper.

mod element;
mod session;
mod storage;

pub use element::HtmlAudioMediaElement;
pub use session::WasmPlaybackSession;
pub use storage::LocalStorageStore;
