//! Published snapshot types.

use std::fmt;

use crate::queue::RepeatMode;
use crate::track::Track;

/// States of the transport state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No track loaded.
    #[default]
    Idle,
    /// Source assigned, playback requested, no position update yet.
    Loading,
    Playing,
    Paused,
    /// The current track finished; transient.
    Ended,
}

impl TransportState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
        }
    }

    /// Whether a source is attached to the media resource.
    pub fn has_source(self) -> bool {
        self != Self::Idle
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the player, republished after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub transport: TransportState,
    /// `queue[cursor]` while a source is attached, otherwise `None`.
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub current_time_sec: f64,
    pub duration_sec: f64,
    pub progress_pct: f64,
    pub volume: f32,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    pub queue: Vec<Track>,
    pub cursor: Option<usize>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            transport: TransportState::Idle,
            current_track: None,
            is_playing: false,
            current_time_sec: 0.0,
            duration_sec: 0.0,
            progress_pct: 0.0,
            volume: super::options::DEFAULT_VOLUME,
            shuffle_enabled: false,
            repeat_mode: RepeatMode::None,
            queue: Vec::new(),
            cursor: None,
        }
    }
}

/// `current / duration * 100`, or 0 while the duration is unknown.
pub fn progress_pct(current_sec: f64, duration_sec: f64) -> f64 {
    if duration_sec > 0.0 {
        (current_sec / duration_sec * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}
