use crate::config::PlaybackSettings;
use crate::queue::RepeatMode;

pub(crate) const DEFAULT_VOLUME: f32 = 0.8;

/// Defaults used until persisted settings are read.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub volume: f32,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    /// Fixed shuffle seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            shuffle: false,
            repeat: RepeatMode::None,
            seed: None,
        }
    }
}

impl From<&PlaybackSettings> for EngineOptions {
    fn from(s: &PlaybackSettings) -> Self {
        Self {
            volume: if s.volume.is_finite() { s.volume.clamp(0.0, 1.0) } else { DEFAULT_VOLUME },
            shuffle: s.shuffle,
            repeat: s.repeat_mode.into(),
            seed: s.shuffle_seed,
        }
    }
}
