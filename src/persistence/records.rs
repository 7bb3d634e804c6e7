use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::queue::RepeatMode;
use crate::track::Track;

pub const QUEUE_KEY: &str = "queue";
pub const SETTINGS_KEY: &str = "settings";

/// Persisted queue contents. The cursor is deliberately not stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub items: Vec<Track>,
    /// Pre-shuffle order, present only while shuffle is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_order: Option<Vec<Track>>,
}

/// Persisted player settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub volume: f32,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
}

impl QueueRecord {
    /// Decode a stored record, dropping tracks that have no media URL.
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(raw) {
            Ok(mut rec) => {
                rec.items.retain(|t| t.media_url().is_some());
                if let Some(saved) = rec.saved_order.as_mut() {
                    saved.retain(|t| t.media_url().is_some());
                }
                Some(rec)
            }
            Err(e) => {
                debug!(error = %e, "ignoring malformed queue record");
                None
            }
        }
    }
}

impl SettingsRecord {
    /// Decode a stored record. Out-of-range volumes are rejected.
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(raw) {
            Ok(rec) if rec.volume.is_finite() && (0.0..=1.0).contains(&rec.volume) => Some(rec),
            Ok(rec) => {
                debug!(volume = rec.volume, "ignoring settings record with bad volume");
                None
            }
            Err(e) => {
                debug!(error = %e, "ignoring malformed settings record");
                None
            }
        }
    }
}
