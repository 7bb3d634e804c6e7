use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{info, warn};

use crate::config;
use crate::engine::{EngineOptions, PlaybackEngine};
use crate::media::{MediaEvent, MediaResource, NullResource, RodioResource};
use crate::persistence::{FileStore, MemoryStore, PersistenceAdapter, default_data_dir};
use crate::track::Track;

pub type Engine = PlaybackEngine<Box<dyn MediaResource>, Box<dyn PersistenceAdapter>>;

/// Open the audio device, falling back to a silent resource.
fn open_media(settings: &config::Settings, events: Sender<MediaEvent>) -> Box<dyn MediaResource> {
    let tick = Duration::from_millis(settings.media.tick_ms);
    match RodioResource::open(events.clone(), tick) {
        Ok(res) => Box::new(res),
        Err(e) => {
            warn!(error = %e, "audio output unavailable; continuing without sound");
            Box::new(NullResource::new(events))
        }
    }
}

fn open_store(settings: &config::Settings) -> Box<dyn PersistenceAdapter> {
    if !settings.persistence.enabled {
        info!("persistence disabled; queue and settings are kept in memory");
        return Box::new(MemoryStore::new());
    }
    match settings.persistence.dir.clone().or_else(default_data_dir) {
        Some(dir) => {
            info!(dir = %dir.display(), "persisting queue and settings");
            Box::new(FileStore::new(dir))
        }
        None => {
            warn!("no data directory available; queue and settings are kept in memory");
            Box::new(MemoryStore::new())
        }
    }
}

/// Build and initialize the engine, then queue any freshly scanned tracks.
pub fn build_engine(
    settings: &config::Settings,
    events: Sender<MediaEvent>,
    scanned: Vec<Track>,
) -> Engine {
    let media = open_media(settings, events);
    let store = open_store(settings);

    let mut engine = PlaybackEngine::new(media, store, EngineOptions::from(&settings.playback));
    engine.init();
    if !scanned.is_empty() {
        engine.enqueue(scanned);
    }
    engine
}
