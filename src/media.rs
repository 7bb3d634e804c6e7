//! Media resource: one audio output playing one URL at a time.
//!
//! The engine drives a [`MediaResource`] with fire-and-forget commands and
//! learns what happened through [`MediaEvent`]s delivered on a channel. Every
//! event carries the [`Generation`] of the `load` it belongs to so the engine
//! can drop callbacks from a superseded load.

mod null;
mod player;
mod sink;
mod thread;
mod types;

pub use null::NullResource;
pub use player::RodioResource;
pub use types::*;
