//! Media command trait, event types and the generation tag.

use std::fmt;
use std::sync::mpsc::Sender;

/// Monotonic tag identifying one `load`. Events from older loads are stale.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// The real duration of the loaded source is known.
    Metadata { duration_sec: f64 },
    /// Playback position advanced.
    TimeUpdate { current_sec: f64 },
    /// The source played to its end.
    Ended,
    /// Network, codec or device failure.
    Error { reason: String },
}

/// One asynchronous notification from a media resource.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub generation: Generation,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(generation: Generation, kind: MediaEventKind) -> Self {
        Self { generation, kind }
    }
}

pub type EventSender = Sender<MediaEvent>;

/// Commands a hardware-backed audio output understands.
///
/// None of these report failure directly: problems surface later as
/// [`MediaEventKind::Error`] on the event channel.
pub trait MediaResource {
    /// Replace the source with `url` and reset time to 0. Later events for this
    /// source are tagged with `generation`.
    fn load(&mut self, url: &str, generation: Generation);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, sec: f64);
    /// `volume` is already clamped to `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Stop and detach the current source.
    fn release(&mut self);
}

impl<M: MediaResource + ?Sized> MediaResource for Box<M> {
    fn load(&mut self, url: &str, generation: Generation) {
        (**self).load(url, generation)
    }
    fn play(&mut self) {
        (**self).play()
    }
    fn pause(&mut self) {
        (**self).pause()
    }
    fn seek_to(&mut self, sec: f64) {
        (**self).seek_to(sec)
    }
    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume)
    }
    fn release(&mut self) {
        (**self).release()
    }
}
