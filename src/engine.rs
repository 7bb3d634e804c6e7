//! The playback engine.
//!
//! `PlaybackEngine` is the only owner of the queue and the transport state.
//! UI code issues commands and reads the published [`PlaybackState`]; media
//! callbacks come back in through [`PlaybackEngine::handle_media_event`] and
//! are fenced by generation so a superseded load can never touch the state.

mod machine;
mod options;
mod state;
mod subscribers;

pub use machine::PlaybackEngine;
pub use options::EngineOptions;
pub use state::*;
pub use subscribers::{EngineEvent, Notice};

#[cfg(test)]
mod tests;
