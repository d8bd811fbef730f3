use tracing::debug;

use super::table::MappingTable;
use crate::models::{Tag, Track};

/// Keys whose mapped value is always appended as a new tag
pub const WELL_KNOWN_TAGS: [&str; 4] = ["tvg-name", "tvg-id", "tvg-logo", "group-title"];

/// Mapping key addressing the display name instead of a tag
pub const NAME_KEY: &str = "name";

/// Name given to added tags unless `append_under_matched_key` is set
pub const APPENDED_TAG_NAME: &str = "tvg-id";

/// Applies a [`MappingTable`] to tracks
///
/// Rules are matched against the track's original name, so a rename never
/// changes which rules apply. A track is remapped at most once: later calls
/// leave an already remapped track untouched.
#[derive(Debug, Clone, Copy)]
pub struct TrackRewriter<'a> {
    table: &'a MappingTable,
    append_under_matched_key: bool,
}

impl<'a> TrackRewriter<'a> {
    pub fn new(table: &'a MappingTable) -> Self {
        Self {
            table,
            append_under_matched_key: false,
        }
    }

    /// Name added tags after the well-known key that matched rather than `tvg-id`
    pub fn append_under_matched_key(mut self, enabled: bool) -> Self {
        self.append_under_matched_key = enabled;
        self
    }

    pub fn rewrite(&self, track: &mut Track) {
        if self.table.is_empty() || track.remapped {
            return;
        }
        let lookup_name = track.original_name.clone();

        for tag in track.tags.iter_mut() {
            let want = self.table.get(&tag.name, &lookup_name);
            if !want.is_empty() {
                tag.value = want.to_string();
            }
        }

        for key in WELL_KNOWN_TAGS {
            let want = self.table.get(key, &lookup_name);
            if want.is_empty() {
                continue;
            }
            let tag_name = if self.append_under_matched_key {
                key
            } else {
                APPENDED_TAG_NAME
            };
            track.tags.push(Tag::new(tag_name, want));
        }

        let new_name = self.table.get(NAME_KEY, &lookup_name);
        if !new_name.is_empty() && new_name != track.name {
            debug!("Renaming track '{}' to '{}'", track.name, new_name);
            track.name = new_name.to_string();
        }
        track.remapped = true;
    }
}
