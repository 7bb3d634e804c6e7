//! Error types shared across the engine.
//!
//! Commands reject bad input or a bad state synchronously with
//! [`PlayerError`]. Media and persistence failures never reach the caller as
//! errors: the engine recovers from them locally.

use thiserror::Error;

/// Synchronous rejection of a transport or queue command.
///
/// A rejected command leaves the published state untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// The track carries no playable media URL.
    #[error("track {track_id} has no media url")]
    MissingMedia { track_id: String },

    /// The command is not valid in the current transport state.
    #[error("{command} is not valid while {state}")]
    InvalidState {
        command: &'static str,
        state: &'static str,
    },
}

/// A failure reported by the media resource (network, codec, device).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("media error: {reason}")]
pub struct MediaError {
    pub reason: String,
}

/// Failure reading or writing a persisted record.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;
