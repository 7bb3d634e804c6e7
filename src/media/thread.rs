use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStreamBuilder, Sink};
use tracing::{debug, info, warn};

use crate::error::MediaError;

use super::sink::create_sink;
use super::types::{EventSender, Generation, MediaEvent, MediaEventKind};

/// Commands accepted by the audio thread.
#[derive(Debug)]
pub(super) enum SinkCmd {
    Load { url: String, generation: Generation },
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Release,
    Shutdown,
}

/// State owned by the audio thread for the current source.
struct Current {
    sink: Sink,
    generation: Generation,
    paused: bool,
    ended_sent: bool,
}

struct Emitter {
    events: EventSender,
}

impl Emitter {
    fn emit(&self, generation: Generation, kind: MediaEventKind) {
        if self.events.send(MediaEvent::new(generation, kind)).is_err() {
            debug!("media event receiver is gone; dropping event");
        }
    }
}

/// Spawn the thread that owns the output stream and the sink.
///
/// `ready` receives the outcome of opening the output device before any
/// command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<SinkCmd>,
    events: EventSender,
    ready: SyncSender<Result<(), MediaError>>,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(MediaError {
                    reason: format!("no audio output device: {e}"),
                }));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which corrupts the TUI.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));
        info!("audio thread started");

        let emitter = Emitter { events };
        let mut current: Option<Current> = None;
        let mut volume: f32 = 1.0;

        loop {
            match rx.recv_timeout(tick) {
                Ok(SinkCmd::Load { url, generation }) => {
                    if let Some(old) = current.take() {
                        old.sink.stop();
                    }
                    match create_sink(&stream, &url) {
                        Ok(loaded) => {
                            loaded.sink.set_volume(volume);
                            if let Some(d) = loaded.duration {
                                emitter.emit(
                                    generation,
                                    MediaEventKind::Metadata {
                                        duration_sec: d.as_secs_f64(),
                                    },
                                );
                            }
                            debug!(%generation, url = %url, "source loaded");
                            current = Some(Current {
                                sink: loaded.sink,
                                generation,
                                paused: true,
                                ended_sent: false,
                            });
                        }
                        Err(e) => {
                            warn!(%generation, url = %url, error = %e, "load failed");
                            emitter.emit(generation, MediaEventKind::Error { reason: e.reason });
                        }
                    }
                }
                Ok(SinkCmd::Play) => {
                    if let Some(c) = current.as_mut() {
                        c.sink.play();
                        c.paused = false;
                    }
                }
                Ok(SinkCmd::Pause) => {
                    if let Some(c) = current.as_mut() {
                        c.sink.pause();
                        c.paused = true;
                    }
                }
                Ok(SinkCmd::Seek(sec)) => {
                    if let Some(c) = current.as_mut() {
                        let target = Duration::from_secs_f64(sec.max(0.0));
                        match c.sink.try_seek(target) {
                            Ok(()) => {
                                c.ended_sent = false;
                                emitter.emit(
                                    c.generation,
                                    MediaEventKind::TimeUpdate {
                                        current_sec: c.sink.get_pos().as_secs_f64(),
                                    },
                                );
                            }
                            Err(e) => warn!(generation = %c.generation, error = %e, "seek failed"),
                        }
                    }
                }
                Ok(SinkCmd::Volume(v)) => {
                    volume = v;
                    if let Some(c) = current.as_ref() {
                        c.sink.set_volume(v);
                    }
                }
                Ok(SinkCmd::Release) => {
                    if let Some(c) = current.take() {
                        c.sink.stop();
                    }
                }
                Ok(SinkCmd::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => {
                    // periodic position report and end-of-track detection
                    if let Some(c) = current.as_mut() {
                        if c.paused || c.ended_sent {
                            continue;
                        }
                        if c.sink.empty() {
                            c.ended_sent = true;
                            emitter.emit(c.generation, MediaEventKind::Ended);
                        } else {
                            emitter.emit(
                                c.generation,
                                MediaEventKind::TimeUpdate {
                                    current_sec: c.sink.get_pos().as_secs_f64(),
                                },
                            );
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Some(c) = current.take() {
            c.sink.stop();
        }
        info!("audio thread exiting");
    })
}
