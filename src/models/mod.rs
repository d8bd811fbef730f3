use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Named attribute on an `#EXTINF` line, e.g. `tvg-logo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One playlist entry
///
/// `name` and `tags` may be rewritten by the mapping table; `original_name`
/// keeps the name the entry was loaded with and is what mapping rules match
/// against. `uri` is never rewritten in place, the relay URL only exists in
/// the persisted playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub original_name: String,
    /// Duration in seconds, `-1` for live streams
    pub length: i64,
    /// Attributes in the order they appear on the `#EXTINF` line
    pub tags: Vec<Tag>,
    pub uri: String,
    /// Set once the mapping table has been applied
    #[serde(default)]
    pub remapped: bool,
}

impl Track {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, length: i64, tags: Vec<Tag>, uri: U) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            length,
            tags,
            uri: uri.into(),
            remapped: false,
        }
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.value.as_str())
    }
}

/// A playlist as delivered by the loader, before any rewriting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    pub tracks: Vec<Track>,
}

impl Playlist {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// The filtered, rewritten playlist the relay serves for its whole lifetime
///
/// Every track sits at the position equal to the index embedded in its relay
/// URL, so a playback request resolves with a plain slice lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewrittenPlaylist {
    pub tracks: Vec<Track>,
    /// Persisted playlist file, `None` when the source playlist was empty
    pub path: Option<PathBuf>,
    /// Number of source tracks dropped because their URI could not be rewritten
    pub skipped: usize,
    pub bytes_written: u64,
}

impl RewrittenPlaylist {
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// How stream URIs are turned into relay URLs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteMode {
    /// Replace the whole path with `/<token>/<user>/<password>/<index>/<basename>`
    #[default]
    IndexAddressed,
    /// Keep the origin path, swapping origin credentials for relay credentials
    CredentialSubstitution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_keeps_original_name() {
        let mut track = Track::new(
            "Channel 1",
            -1,
            vec![Tag::new("group-title", "News")],
            "http://origin.example/1.ts",
        );
        track.name = "World News".to_string();

        assert_eq!(track.original_name, "Channel 1");
        assert_eq!(track.tag("group-title"), Some("News"));
        assert!(!track.remapped);
        assert_eq!(track.tag("tvg-id"), None);
    }

    #[test]
    fn test_rewrite_mode_serde() {
        let mode: RewriteMode = serde_json::from_str("\"credential_substitution\"").unwrap();
        assert_eq!(mode, RewriteMode::CredentialSubstitution);
        assert_eq!(RewriteMode::default(), RewriteMode::IndexAddressed);
    }
}
