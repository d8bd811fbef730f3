use tracing::{debug, info};

use crate::errors::{SourceError, SourceResult};
use crate::models::{Tag, Track};

const EXTM3U: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";

/// Parse extended M3U content into tracks
///
/// Every `#EXTINF` attribute is kept in source order. The URI is the next
/// line that is neither blank nor a `#` directive.
pub fn parse_m3u(content: &str) -> SourceResult<Vec<Track>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut lines = content.lines().map(str::trim);

    match lines.by_ref().find(|line| !line.is_empty()) {
        Some(first) if first.starts_with(EXTM3U) => {}
        _ => {
            return Err(SourceError::parse_error(
                "missing #EXTM3U header, not an extended M3U playlist",
            ));
        }
    }

    let mut tracks = Vec::new();
    let mut pending: Option<(String, i64, Vec<Tag>)> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        if let Some(extinf) = line.strip_prefix(EXTINF) {
            if let Some((name, _, _)) = pending.take() {
                debug!("Dropping entry '{}' without a stream URI", name);
            }
            pending = Some(parse_extinf(extinf));
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        match pending.take() {
            Some((name, length, tags)) => tracks.push(Track::new(name, length, tags, line)),
            None => debug!("Ignoring URI without #EXTINF entry: {}", line),
        }
    }

    if let Some((name, _, _)) = pending {
        debug!("Dropping entry '{}' without a stream URI", name);
    }

    info!("M3U parsing completed: {} tracks parsed", tracks.len());
    Ok(tracks)
}

/// Split `<length> k="v" ...,<name>` into its parts
fn parse_extinf(extinf: &str) -> (String, i64, Vec<Tag>) {
    let (header, name) = match find_unquoted_comma(extinf) {
        Some(pos) => (&extinf[..pos], extinf[pos + 1..].trim()),
        None => (extinf, ""),
    };

    let header = header.trim_start();
    let (length_token, attributes) = match header.find(char::is_whitespace) {
        Some(pos) => (&header[..pos], &header[pos..]),
        None => (header, ""),
    };

    let length = length_token
        .parse::<f64>()
        .map(|seconds| seconds as i64)
        .unwrap_or(-1);

    (name.to_string(), length, parse_attributes(attributes))
}

fn find_unquoted_comma(text: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escape_next = false;
    for (pos, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escape_next = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return Some(pos),
            _ => {}
        }
    }
    None
}

fn parse_attributes(attributes: &str) -> Vec<Tag> {
    let mut tags = Vec::new();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_value = false;
    let mut escape_next = false;

    for ch in attributes.chars() {
        if escape_next {
            if ch != '"' && ch != '\\' {
                current_value.push('\\');
            }
            current_value.push(ch);
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_quotes => escape_next = true,
            '"' if in_value => in_quotes = !in_quotes,
            '=' if !in_value => in_value = true,
            c if c.is_whitespace() && !in_quotes => {
                if in_value {
                    tags.push(Tag::new(current_key.trim(), std::mem::take(&mut current_value)));
                    in_value = false;
                }
                current_key.clear();
            }
            c => {
                if in_value {
                    current_value.push(c);
                } else {
                    current_key.push(c);
                }
            }
        }
    }

    if in_value {
        tags.push(Tag::new(current_key.trim(), current_value));
    }

    tags
}
