use tracing::warn;

use super::types::{EventSender, Generation, MediaEvent, MediaEventKind, MediaResource};

/// Stand-in used when no audio output device could be opened.
///
/// Accepts every command and answers `play` with an error event so the UI
/// shows why nothing is audible.
pub struct NullResource {
    events: EventSender,
    generation: Option<Generation>,
}

impl NullResource {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            generation: None,
        }
    }
}

impl MediaResource for NullResource {
    fn load(&mut self, _url: &str, generation: Generation) {
        self.generation = Some(generation);
    }

    fn play(&mut self) {
        let Some(generation) = self.generation else {
            return;
        };
        let event = MediaEvent::new(
            generation,
            MediaEventKind::Error {
                reason: "no audio output device".to_string(),
            },
        );
        if self.events.send(event).is_err() {
            warn!("media event receiver is gone");
        }
    }

    fn pause(&mut self) {}

    fn seek_to(&mut self, _sec: f64) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn release(&mut self) {
        self.generation = None;
    }
}
