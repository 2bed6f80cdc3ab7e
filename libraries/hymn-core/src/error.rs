/// Track resolution errors
use thiserror::Error;

/// Result type alias using `ResolutionError`
pub type Result<T> = std::result::Result<T, ResolutionError>;

/// Failure to turn a source record into a playable track
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The record carries no audio URL and none can be derived from it
    #[error("No playable audio URL for record {id}")]
    MissingAudioUrl { id: String },

    /// The record carries an audio URL that cannot be parsed or joined
    #[error("Invalid audio URL for record {id}: {url}")]
    InvalidAudioUrl { id: String, url: String },

    /// The configured media base URL is not a valid absolute URL
    #[error("Invalid media base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ResolutionError {
    /// Create a missing audio URL error
    pub fn missing_audio_url(id: impl Into<String>) -> Self {
        Self::MissingAudioUrl { id: id.into() }
    }

    /// Create an invalid audio URL error
    pub fn invalid_audio_url(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::InvalidAudioUrl {
            id: id.into(),
            url: url.into(),
        }
    }
}
