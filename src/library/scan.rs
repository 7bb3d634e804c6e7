use std::fs;
use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::tag::Accessor;
use tracing::{debug, info, warn};
use url::Url;
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::track::Track;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a `file://` URL for `path`, resolved to an absolute path.
///
/// Returns `None` when the path cannot be made absolute.
pub fn file_url_for(path: &Path) -> Option<String> {
    let abs = fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .ok()?;
    Url::from_file_path(&abs).ok().map(String::from)
}

fn track_from_file(path: &Path) -> Option<Track> {
    let default_title = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "UNKNOWN".to_string());

    let Some(url) = file_url_for(path) else {
        warn!(path = %path.display(), "cannot build a file url; skipping");
        return None;
    };
    let mut track = Track::new(url.clone(), default_title).with_file_url(url);

    if let Ok(tagged) = lofty::read_from_path(path) {
        let duration = tagged.properties().duration();
        if !duration.is_zero() {
            track.duration_sec = Some(duration.as_secs_f64());
        }

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    track.title = v.trim().to_string();
                }
            }
            if let Some(v) = tag.artist() {
                track.artist_name = v.trim().to_string();
            }
        }
    } else {
        debug!(path = %path.display(), "no readable tags");
    }

    Some(track)
}

/// Walk `dir` and return every audio file as a `Track`, sorted by display text.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.extend(track_from_file(path));
        }
    }

    tracks.sort_by_key(|t| t.display().to_lowercase());
    info!(dir = %dir.display(), count = tracks.len(), "library scan finished");
    tracks
}

