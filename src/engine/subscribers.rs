use std::sync::mpsc::{self, Receiver, Sender};

use super::state::PlaybackState;

/// A recoverable problem the UI should show without blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub track_id: Option<String>,
}

/// What subscribers receive.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StateChanged(PlaybackState),
    Notice(Notice),
}

/// Fan-out of engine events to channel subscribers. Closed receivers are pruned.
#[derive(Debug, Default)]
pub(super) struct Subscribers {
    senders: Vec<Sender<EngineEvent>>,
}

impl Subscribers {
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub fn broadcast(&mut self, event: EngineEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
