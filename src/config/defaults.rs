//! Default configuration values

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOSTNAME: &str = "localhost";

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Suffix of the playlist file written to the temp directory when no
/// explicit output path is configured
pub const DEFAULT_PLAYLIST_FILE_SUFFIX: &str = ".m3u-relay.m3u";

pub const DEFAULT_KEEP_ORIGINAL_URLS: bool = false;
pub const DEFAULT_APPEND_TAGS_UNDER_MATCHED_KEY: bool = false;
