/// Common test utilities and fixtures
use hymn_playback::test_utils::FakeMediaElement;
use hymn_playback::{BackendEvent, PlaybackConfig, PlaybackSession};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness (`RUST_LOG=debug` to see it)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Session over a fake element, plus a handle to that element
#[allow(dead_code)]
pub fn session_with(config: PlaybackConfig) -> (PlaybackSession, FakeMediaElement) {
    init_tracing();
    let element = FakeMediaElement::new();
    let session = PlaybackSession::new(config, Box::new(element.clone())).unwrap();
    (session, element)
}

#[allow(dead_code)]
pub fn session() -> (PlaybackSession, FakeMediaElement) {
    session_with(PlaybackConfig::default())
}

/// Deliver `event` tagged with the element's current generation
#[allow(dead_code)]
pub fn fire(session: &mut PlaybackSession, element: &FakeMediaElement, event: BackendEvent) {
    session.handle_backend_event(element.event(event));
}
