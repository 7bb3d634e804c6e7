//! The playable item handed to the engine by catalog collaborators.

use serde::{Deserialize, Serialize};

/// Immutable descriptor of one playable media item.
///
/// Two tracks are equal when their ids are equal; the other fields are
/// descriptive and never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Catalog-provided hint; the media resource's reported duration wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<f64>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist_name: String::new(),
            artwork_url: None,
            file_url: None,
            duration_sec: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist_name = artist.into();
        self
    }

    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file_url = Some(url.into());
        self
    }

    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, secs: f64) -> Self {
        self.duration_sec = Some(secs);
        self
    }

    /// The media URL, if present and non-blank.
    pub fn media_url(&self) -> Option<&str> {
        self.file_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// "Artist - Title", or just the title when the artist is blank.
    pub fn display(&self) -> String {
        match self.artist_name.trim() {
            "" => self.title.clone(),
            artist => format!("{} - {}", artist, self.title),
        }
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_id_only() {
        let a = Track::new("1", "Song").with_artist("X");
        let b = Track::new("1", "Other title");
        let c = Track::new("2", "Song").with_artist("X");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn media_url_ignores_blank_values() {
        assert_eq!(Track::new("1", "a").media_url(), None);
        assert_eq!(Track::new("1", "a").with_file_url("   ").media_url(), None);
        assert_eq!(
            Track::new("1", "a").with_file_url("file:///m.mp3").media_url(),
            Some("file:///m.mp3")
        );
    }

    #[test]
    fn display_prefers_artist_dash_title() {
        assert_eq!(Track::new("1", "Song").with_artist("Artist").display(), "Artist - Song");
        assert_eq!(Track::new("1", "Song").with_artist("  ").display(), "Song");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let t = Track::new("7", "Song")
            .with_artist("Band")
            .with_file_url("file:///a.flac")
            .with_duration(12.5);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["artistName"], "Band");
        assert_eq!(json["fileUrl"], "file:///a.flac");
        assert_eq!(json["durationSec"], 12.5);
        assert!(json.get("artworkUrl").is_none());
    }
}
