//! Utilities for creating `rodio` sinks from media URLs.
//!
//! The helper here resolves a URL to a local file, decodes it and prepares a
//! paused `Sink` together with the source's duration.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};
use url::Url;

use crate::error::MediaError;

/// A freshly loaded, paused sink.
pub(super) struct LoadedSink {
    pub sink: Sink,
    pub duration: Option<Duration>,
}

/// Map a `file://` URL or a bare path to a filesystem path.
pub(super) fn url_to_path(url: &str) -> Result<PathBuf, MediaError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(MediaError {
            reason: "empty media url".to_string(),
        });
    }
    if !url.contains("://") {
        return Ok(PathBuf::from(url));
    }

    let parsed = Url::parse(url).map_err(|e| MediaError {
        reason: format!("invalid media url {url}: {e}"),
    })?;
    if parsed.scheme() != "file" {
        return Err(MediaError {
            reason: format!("unsupported url scheme: {url}"),
        });
    }
    parsed.to_file_path().map_err(|()| MediaError {
        reason: format!("not a local file url: {url}"),
    })
}

/// Open and decode `url`, returning a paused sink attached to `stream`.
pub(super) fn create_sink(stream: &OutputStream, url: &str) -> Result<LoadedSink, MediaError> {
    let path = url_to_path(url)?;
    let file = File::open(&path).map_err(|e| MediaError {
        reason: format!("failed to open {}: {e}", path.display()),
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| MediaError {
        reason: format!("failed to decode {}: {e}", path.display()),
    })?;
    let duration = source.total_duration().or_else(|| probe_duration(&path));

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(LoadedSink { sink, duration })
}

/// Read the duration from the file's tags/properties when the decoder can't tell.
fn probe_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
