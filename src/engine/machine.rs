use std::sync::mpsc::Receiver;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PersistenceError, PlayerError, Result};
use crate::media::{Generation, MediaEvent, MediaEventKind, MediaResource};
use crate::persistence::{
    PersistenceAdapter, QUEUE_KEY, QueueRecord, SETTINGS_KEY, SettingsRecord,
};
use crate::queue::{Advance, Direction, Jump, QueueManager, RepeatMode};
use crate::track::Track;

use super::options::EngineOptions;
use super::state::{PlaybackState, TransportState, progress_pct};
use super::subscribers::{EngineEvent, Notice, Subscribers};

/// Owns the queue, the media resource and the transport state machine.
///
/// All mutation goes through `&mut self`, so commands and media events are
/// serialized by whoever owns the engine. Each `load` gets a fresh
/// [`Generation`]; events carrying any other generation are dropped.
pub struct PlaybackEngine<M, P> {
    media: M,
    store: P,
    queue: QueueManager,
    transport: TransportState,
    current_time_sec: f64,
    duration_sec: f64,
    volume: f32,
    generation: Generation,
    /// The media resource reported an error for the current source.
    media_failed: bool,
    options: EngineOptions,
    rng: StdRng,
    published: PlaybackState,
    subscribers: Subscribers,
}

impl<M: MediaResource, P: PersistenceAdapter> PlaybackEngine<M, P> {
    /// Build an engine with default state. Call [`init`](Self::init) to restore
    /// the persisted queue and settings.
    pub fn new(media: M, store: P, options: EngineOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let queue = QueueManager::restore(Vec::new(), None, options.shuffle, options.repeat);

        let mut engine = Self {
            media,
            store,
            queue,
            transport: TransportState::Idle,
            current_time_sec: 0.0,
            duration_sec: 0.0,
            volume: options.volume.clamp(0.0, 1.0),
            generation: Generation::default(),
            media_failed: false,
            options,
            rng,
            published: PlaybackState::default(),
            subscribers: Subscribers::default(),
        };
        engine.media.set_volume(engine.volume);
        engine.published = engine.compute_state();
        engine
    }

    /// Read the persisted queue and settings once. Missing or malformed
    /// records silently fall back to the configured defaults.
    pub fn init(&mut self) {
        let settings = self
            .read_record(SETTINGS_KEY)
            .and_then(|raw| SettingsRecord::decode(&raw));
        let record = self
            .read_record(QUEUE_KEY)
            .and_then(|raw| QueueRecord::decode(&raw))
            .unwrap_or_default();

        let (volume, shuffle, repeat) = match settings {
            Some(s) => (s.volume, s.shuffle_enabled, s.repeat_mode),
            None => (self.options.volume, self.options.shuffle, self.options.repeat),
        };

        self.queue = QueueManager::restore(record.items, record.saved_order, shuffle, repeat);
        self.volume = volume.clamp(0.0, 1.0);
        self.media.set_volume(self.volume);

        info!(
            tracks = self.queue.len(),
            volume = self.volume,
            shuffle,
            repeat = repeat.as_str(),
            "playback engine initialized"
        );
        self.publish();
    }

    /// Release the media resource. The engine is left `Idle` and still usable.
    pub fn dispose(&mut self) {
        self.halt();
        info!("playback engine disposed");
        self.publish();
    }

    /// The current published snapshot.
    pub fn snapshot(&self) -> &PlaybackState {
        &self.published
    }

    /// Receive every state change and notice from now on.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        self.subscribers.subscribe()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn queue(&self) -> &QueueManager {
        &self.queue
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    // ------------------------------------------------------------------
    // Transport commands
    // ------------------------------------------------------------------

    /// Play `track` (queueing it if needed), or resume the current track.
    ///
    /// A track without a media URL is rejected and nothing changes.
    pub fn play(&mut self, track: Option<&Track>) -> Result<()> {
        let Some(track) = track else {
            self.resume();
            return Ok(());
        };

        if track.media_url().is_none() {
            return Err(PlayerError::MissingMedia {
                track_id: track.id.clone(),
            });
        }

        if let Jump::Appended(i) = self.queue.jump_to(track) {
            debug!(index = i, id = %track.id, "queued track for playback");
            self.persist_queue();
        }
        self.start_current();
        self.publish();
        Ok(())
    }

    /// Play the queue entry at `index`. Out-of-range indices are ignored.
    pub fn play_at(&mut self, index: usize) {
        if self.queue.jump_to_index(index).is_some() {
            self.start_current();
            self.publish();
        }
    }

    fn resume(&mut self) {
        match self.transport {
            TransportState::Playing | TransportState::Loading => {}
            TransportState::Paused if !self.media_failed => {
                self.media.play();
                self.transport = TransportState::Playing;
                self.publish();
            }
            TransportState::Paused | TransportState::Ended | TransportState::Idle => {
                if self.queue.current().is_some() {
                    self.start_current();
                    self.publish();
                }
            }
        }
    }

    pub fn pause(&mut self) {
        if matches!(
            self.transport,
            TransportState::Playing | TransportState::Loading
        ) {
            self.media.pause();
            self.transport = TransportState::Paused;
            self.publish();
        }
    }

    /// Detach the source and go `Idle`. The queue is kept.
    pub fn stop(&mut self) {
        if self.transport == TransportState::Idle {
            return;
        }
        self.halt();
        self.publish();
    }

    /// Seek within the loaded track, clamped to `[0, duration]`.
    ///
    /// Until the media resource reports a duration (`duration_sec == 0`) only
    /// the lower bound applies and the target goes to the resource as is.
    /// Non-finite targets seek to 0.
    pub fn seek(&mut self, sec: f64) -> Result<()> {
        if !self.transport.has_source() {
            return Err(PlayerError::InvalidState {
                command: "seek",
                state: self.transport.as_str(),
            });
        }

        let mut target = if sec.is_finite() { sec.max(0.0) } else { 0.0 };
        if self.duration_sec > 0.0 {
            target = target.min(self.duration_sec);
        }
        self.media.seek_to(target);
        self.current_time_sec = target;
        self.publish();
        Ok(())
    }

    pub fn next(&mut self) {
        self.step(Direction::Next);
        self.publish();
    }

    pub fn previous(&mut self) {
        self.step(Direction::Previous);
        self.publish();
    }

    /// Set the output volume, clamped to `[0, 1]`. `NaN` is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_nan() {
            return;
        }
        self.volume = volume.clamp(0.0, 1.0);
        self.media.set_volume(self.volume);
        self.persist_settings();
        self.publish();
    }

    // ------------------------------------------------------------------
    // Queue commands
    // ------------------------------------------------------------------

    /// Append tracks not queued yet. Tracks without a media URL are skipped.
    pub fn enqueue(&mut self, tracks: impl IntoIterator<Item = Track>) {
        let playable = tracks.into_iter().filter(|t| {
            let ok = t.media_url().is_some();
            if !ok {
                warn!(id = %t.id, "skipping track without media url");
            }
            ok
        });

        if self.queue.enqueue(playable) > 0 {
            self.persist_queue();
            self.publish();
        }
    }

    /// Remove the entry at `index`.
    ///
    /// Removing the current entry moves on to the entry that took its place:
    /// it starts playing if playback was active, otherwise the engine goes idle.
    pub fn remove_from_queue(&mut self, index: usize) {
        let Some(removal) = self.queue.remove_at(index) else {
            return;
        };

        if removal.was_current && self.transport.has_source() {
            let was_active = matches!(
                self.transport,
                TransportState::Playing | TransportState::Loading
            );
            debug!(id = %removal.track.id, was_active, "removed the loaded track");
            if was_active && !self.queue.is_empty() {
                self.start_current();
            } else {
                self.halt();
            }
        }

        self.persist_queue();
        self.publish();
    }

    /// Empty the queue and stop playback.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        if self.transport.has_source() {
            self.halt();
        }
        self.persist_queue();
        self.publish();
    }

    pub fn toggle_shuffle(&mut self) {
        let enabled = !self.queue.shuffle_enabled();
        self.set_shuffle(enabled);
    }

    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.queue.set_shuffle(enabled, &mut self.rng) {
            self.persist_queue();
            self.persist_settings();
            self.publish();
        }
    }

    /// Cycle repeat `none -> all -> one -> none`.
    pub fn toggle_repeat(&mut self) {
        let mode = self.queue.repeat_mode().cycle();
        self.set_repeat(mode);
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.queue.repeat_mode() == mode {
            return;
        }
        self.queue.set_repeat(mode);
        self.persist_settings();
        self.publish();
    }

    // ------------------------------------------------------------------
    // Media events
    // ------------------------------------------------------------------

    /// Reconcile one event from the media resource.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if event.generation != self.generation || !self.transport.has_source() {
            debug!(
                event_gen = %event.generation,
                current_gen = %self.generation,
                kind = ?event.kind,
                "dropping stale media event"
            );
            return;
        }

        match event.kind {
            MediaEventKind::Metadata { duration_sec } => {
                if duration_sec.is_finite() && duration_sec >= 0.0 {
                    self.duration_sec = duration_sec;
                }
            }
            MediaEventKind::TimeUpdate { current_sec } => {
                if current_sec.is_finite() {
                    self.current_time_sec = current_sec.max(0.0);
                }
                if self.transport == TransportState::Loading {
                    self.transport = TransportState::Playing;
                }
            }
            MediaEventKind::Ended => self.on_ended(),
            MediaEventKind::Error { reason } => self.on_error(reason),
        }
        self.publish();
    }

    fn on_ended(&mut self) {
        self.transport = TransportState::Ended;
        if self.queue.repeat_mode() == RepeatMode::One {
            self.restart_current();
        } else {
            self.step(Direction::Next);
        }
    }

    fn on_error(&mut self, reason: String) {
        let track_id = self.queue.current().map(|t| t.id.clone());
        warn!(track = ?track_id, reason = %reason, "media error; pausing");

        self.transport = TransportState::Paused;
        self.media_failed = true;
        self.subscribers.broadcast(EngineEvent::Notice(Notice {
            message: format!("Playback failed: {reason}"),
            track_id,
        }));
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn step(&mut self, direction: Direction) {
        match self.queue.advance(direction, self.queue.repeat_mode()) {
            Advance::Moved(_) => self.start_current(),
            Advance::Restart(_) => self.restart_current(),
            Advance::Exhausted => {
                if self.transport.has_source() {
                    debug!(?direction, "queue exhausted; stopping");
                    self.halt();
                }
            }
        }
    }

    /// Load the track under the cursor under a new generation and play it.
    fn start_current(&mut self) {
        let Some(track) = self.queue.current().cloned() else {
            self.halt();
            return;
        };
        let Some(url) = track.media_url() else {
            warn!(id = %track.id, "current track has no media url");
            self.halt();
            return;
        };

        self.generation = self.generation.next();
        self.transport = TransportState::Loading;
        self.media_failed = false;
        self.current_time_sec = 0.0;
        self.duration_sec = track
            .duration_sec
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(0.0);

        debug!(generation = %self.generation, id = %track.id, url, "loading track");
        self.media.load(url, self.generation);
        self.media.play();
    }

    /// Replay the loaded track from 0, reloading it if the source failed.
    fn restart_current(&mut self) {
        if !self.transport.has_source() || self.media_failed {
            self.start_current();
            return;
        }
        self.media.seek_to(0.0);
        self.media.play();
        self.current_time_sec = 0.0;
        self.transport = TransportState::Playing;
    }

    /// Release the source and invalidate any in-flight events.
    fn halt(&mut self) {
        self.media.release();
        self.generation = self.generation.next();
        self.transport = TransportState::Idle;
        self.media_failed = false;
        self.current_time_sec = 0.0;
        self.duration_sec = 0.0;
    }

    fn compute_state(&self) -> PlaybackState {
        let current_track = if self.transport.has_source() {
            self.queue.current().cloned()
        } else {
            None
        };

        PlaybackState {
            transport: self.transport,
            current_track,
            is_playing: matches!(
                self.transport,
                TransportState::Playing | TransportState::Loading
            ),
            current_time_sec: self.current_time_sec,
            duration_sec: self.duration_sec,
            progress_pct: progress_pct(self.current_time_sec, self.duration_sec),
            volume: self.volume,
            shuffle_enabled: self.queue.shuffle_enabled(),
            repeat_mode: self.queue.repeat_mode(),
            queue: self.queue.items().to_vec(),
            cursor: self.queue.cursor(),
        }
    }

    /// Recompute the snapshot and notify subscribers if it changed.
    fn publish(&mut self) {
        let next = self.compute_state();
        if next == self.published {
            return;
        }
        self.published = next;
        self.subscribers
            .broadcast(EngineEvent::StateChanged(self.published.clone()));
    }

    fn read_record(&self, key: &str) -> Option<String> {
        match self.store.read(key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "failed to read persisted record; using defaults");
                None
            }
        }
    }

    fn write_record<T: Serialize>(&mut self, key: &str, record: &T) {
        let result = serde_json::to_string(record)
            .map_err(PersistenceError::from)
            .and_then(|raw| self.store.write(key, &raw));
        if let Err(e) = result {
            warn!(key, error = %e, "failed to persist record");
        }
    }

    fn persist_queue(&mut self) {
        let record = QueueRecord {
            items: self.queue.items().to_vec(),
            saved_order: self.queue.saved_order().map(<[Track]>::to_vec),
        };
        self.write_record(QUEUE_KEY, &record);
    }

    fn persist_settings(&mut self) {
        let record = SettingsRecord {
            volume: self.volume,
            shuffle_enabled: self.queue.shuffle_enabled(),
            repeat_mode: self.queue.repeat_mode(),
        };
        self.write_record(SETTINGS_KEY, &record);
    }
}
