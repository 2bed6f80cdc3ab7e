//! Error types for playback management

use hymn_core::ResolutionError;
use thiserror::Error;

/// Playback errors
///
/// Only `Resolution`, `InvalidContext`, `TrackNotFound`, `QueueInvariant` and
/// `Config` are ever returned from session commands. Backend failures are
/// captured into the session state and surfaced through events.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Record could not be turned into a playable track
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Backend declined to start playback (e.g. autoplay policy)
    #[error("Playback rejected by backend: {0}")]
    BackendRejected(String),

    /// Media failed while loading or playing
    #[error("Playback failed: {0}")]
    BackendPlayback(String),

    /// Internal queue bookkeeping was handed impossible indices
    #[error("Queue invariant violated: {0}")]
    QueueInvariant(String),

    /// Playback context request does not describe a valid collection position
    #[error("Invalid playback context: {0}")]
    InvalidContext(String),

    /// No known track carries this id
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Storage backend refused the operation
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
