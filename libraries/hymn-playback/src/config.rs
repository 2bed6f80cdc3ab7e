/// Playback configuration
use crate::error::{PlaybackError, Result};
use crate::types::RepeatMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Maximum tracks kept for "previous"
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Initial volume (0.0-1.0), overridden by a restored snapshot
    #[serde(default = "default_volume")]
    pub volume: f32,

    #[serde(default)]
    pub repeat: RepeatMode,

    /// Minimum spacing between snapshot writes
    #[serde(default = "default_persist_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// "Previous" restarts the track instead when further in than this
    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    /// Base URL relative audio/cover paths are joined onto
    #[serde(default)]
    pub media_base_url: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            volume: default_volume(),
            repeat: RepeatMode::Off,
            persist_debounce_ms: default_persist_debounce_ms(),
            restart_threshold_secs: default_restart_threshold_secs(),
            media_base_url: None,
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables are prefixed with `HYMN_PLAYBACK_`, e.g.
    /// `HYMN_PLAYBACK_HISTORY_SIZE=100`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            }
        }

        settings = settings.add_source(config::Environment::with_prefix("HYMN_PLAYBACK").try_parsing(true));

        let config = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::Config(format!(
                "volume must be within 0.0-1.0, got {}",
                self.volume
            )));
        }

        if !self.restart_threshold_secs.is_finite() || self.restart_threshold_secs < 0.0 {
            return Err(PlaybackError::Config(format!(
                "restart_threshold_secs must be a non-negative number, got {}",
                self.restart_threshold_secs
            )));
        }

        Ok(())
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }
}

// Default values
fn default_history_size() -> usize {
    50
}

fn default_volume() -> f32 {
    0.8
}

fn default_persist_debounce_ms() -> u64 {
    1000
}

fn default_restart_threshold_secs() -> f64 {
    3.0
}
