use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, error, info};

use super::identity::ProxyIdentity;
use super::url_transcoder::transcode;
use crate::data_mapping::{MappingTable, TrackRewriter};
use crate::errors::{AppError, AppResult};
use crate::models::{Playlist, RewriteMode, RewrittenPlaylist, Track};
use crate::utils::UrlUtils;

pub const M3U_HEADER: &str = "#EXTM3U";

/// Tracks that made it into the output, plus what the pass wrote
#[derive(Debug, Clone, Default)]
pub struct SerializeOutcome {
    pub tracks: Vec<Track>,
    pub skipped: usize,
    pub bytes_written: u64,
}

/// Rewrites tracks and writes them out as an M3U playlist
pub struct PlaylistGenerator<'a> {
    identity: &'a ProxyIdentity,
    rewriter: TrackRewriter<'a>,
    mode: RewriteMode,
}

impl<'a> PlaylistGenerator<'a> {
    pub fn new(identity: &'a ProxyIdentity, table: &'a MappingTable) -> Self {
        Self {
            identity,
            rewriter: TrackRewriter::new(table),
            mode: RewriteMode::IndexAddressed,
        }
    }

    pub fn with_mode(mut self, mode: RewriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn append_under_matched_key(mut self, enabled: bool) -> Self {
        self.rewriter = self.rewriter.append_under_matched_key(enabled);
        self
    }

    /// Single pass over `tracks` in order
    ///
    /// Each track is remapped, then its URI transcoded with the index it
    /// will have among the kept tracks. Tracks whose URI cannot be rewritten
    /// are logged and dropped, which keeps later indices contiguous. Only
    /// I/O errors on `into` abort the pass.
    pub fn serialize<W: Write>(
        &self,
        tracks: Vec<Track>,
        into: &mut W,
    ) -> std::io::Result<SerializeOutcome> {
        let mut kept = Vec::with_capacity(tracks.len());
        let mut skipped = 0usize;

        let header = format!("{M3U_HEADER}\n");
        into.write_all(header.as_bytes())?;
        let mut bytes_written = header.len() as u64;

        for (position, mut track) in tracks.into_iter().enumerate() {
            self.rewriter.rewrite(&mut track);

            let index = position - skipped;
            let relay_url = match transcode(self.identity, &track.uri, index, self.mode) {
                Ok(url) => url,
                Err(e) => {
                    skipped += 1;
                    error!("Skipping track '{}': {}", track.name, e);
                    continue;
                }
            };

            let entry = format!("{}\n{}\n", format_extinf(&track), relay_url);
            into.write_all(entry.as_bytes())?;
            bytes_written += entry.len() as u64;

            debug!(
                "Track {} '{}' -> {}",
                index,
                track.name,
                UrlUtils::obfuscate_credentials(&relay_url)
            );
            kept.push(track);
        }

        Ok(SerializeOutcome {
            tracks: kept,
            skipped,
            bytes_written,
        })
    }

    /// Serialize into memory instead of a file
    pub fn render(&self, tracks: Vec<Track>) -> (String, SerializeOutcome) {
        let mut buffer = Vec::new();
        let outcome = match self.serialize(tracks, &mut buffer) {
            Ok(outcome) => outcome,
            // Writing to a Vec cannot fail
            Err(_) => SerializeOutcome::default(),
        };
        (String::from_utf8_lossy(&buffer).into_owned(), outcome)
    }
}

/// `#EXTINF:<length> k0="v0" ... kn="vn", <name>`
pub fn format_extinf(track: &Track) -> String {
    let tags: Vec<String> = track
        .tags
        .iter()
        .map(|tag| format!("{}={}", tag.name, quote_tag_value(&tag.value)))
        .collect();
    format!("#EXTINF:{} {}, {}", track.length, tags.join(" "), track.name)
}

/// Double-quote a tag value, escaping quotes, backslashes and control characters
pub fn quote_tag_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{07}' => quoted.push_str("\\a"),
            '\u{08}' => quoted.push_str("\\b"),
            '\u{0b}' => quoted.push_str("\\v"),
            '\u{0c}' => quoted.push_str("\\f"),
            c if c.is_control() && (c as u32) < 0x80 => {
                quoted.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Rewrite `playlist` once and persist it at `output_path`
///
/// An empty playlist is a no-op: no file is created. Otherwise the file is
/// created or truncated, written, flushed and synced before the rewritten
/// playlist is handed back. Any file error is fatal for startup.
pub fn initialize_playlist(
    playlist: Playlist,
    generator: &PlaylistGenerator<'_>,
    output_path: &Path,
) -> AppResult<RewrittenPlaylist> {
    if playlist.is_empty() {
        info!("Source playlist has no tracks, nothing to publish");
        return Ok(RewrittenPlaylist::default());
    }

    let source_tracks = playlist.len();
    let file = File::create(output_path).map_err(|e| AppError::io(output_path, e))?;
    let mut writer = BufWriter::new(file);

    let outcome = generator
        .serialize(playlist.tracks, &mut writer)
        .map_err(|e| AppError::io(output_path, e))?;

    let file = writer
        .into_inner()
        .map_err(|e| AppError::io(output_path, e.into_error()))?;
    file.sync_all().map_err(|e| AppError::io(output_path, e))?;

    info!(
        "Published {} of {} tracks ({} skipped, {} bytes) to {}",
        outcome.tracks.len(),
        source_tracks,
        outcome.skipped,
        outcome.bytes_written,
        output_path.display()
    );

    Ok(RewrittenPlaylist {
        tracks: outcome.tracks,
        path: Some(output_path.to_path_buf()),
        skipped: outcome.skipped,
        bytes_written: outcome.bytes_written,
    })
}
