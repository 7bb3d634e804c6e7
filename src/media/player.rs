use std::sync::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::error::MediaError;

use super::thread::{SinkCmd, spawn_audio_thread};
use super::types::{EventSender, Generation, MediaResource};

/// `MediaResource` backed by a `rodio` sink living on its own audio thread.
///
/// Commands are queued to the thread and return immediately.
pub struct RodioResource {
    tx: Sender<SinkCmd>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioResource {
    /// Open the default output device and start the audio thread.
    ///
    /// `tick` is how often position updates are reported while playing.
    pub fn open(events: EventSender, tick: Duration) -> Result<Self, MediaError> {
        let (tx, rx) = mpsc::channel::<SinkCmd>();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = spawn_audio_thread(rx, events, ready_tx, tick.max(Duration::from_millis(20)));

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                tx,
                join: Mutex::new(Some(handle)),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => Err(MediaError {
                reason: "audio thread exited during startup".to_string(),
            }),
        }
    }

    fn send(&self, cmd: SinkCmd) {
        if let Err(e) = self.tx.send(cmd) {
            warn!(cmd = ?e.0, "audio thread is gone");
        }
    }

    /// Stop the audio thread and wait for it to exit.
    pub fn shutdown(&self) {
        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                self.send(SinkCmd::Shutdown);
                let _ = h.join();
            }
        }
    }
}

impl MediaResource for RodioResource {
    fn load(&mut self, url: &str, generation: Generation) {
        self.send(SinkCmd::Load {
            url: url.to_string(),
            generation,
        });
    }

    fn play(&mut self) {
        self.send(SinkCmd::Play);
    }

    fn pause(&mut self) {
        self.send(SinkCmd::Pause);
    }

    fn seek_to(&mut self, sec: f64) {
        self.send(SinkCmd::Seek(sec));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(SinkCmd::Volume(volume));
    }

    fn release(&mut self) {
        self.send(SinkCmd::Release);
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.shutdown();
    }
}
