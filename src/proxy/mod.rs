//! Playlist rewriting: relay identity, URL transcoding and M3U generation

pub mod generator;
pub mod identity;
pub mod url_transcoder;

pub use generator::{PlaylistGenerator, SerializeOutcome, initialize_playlist};
pub use identity::ProxyIdentity;
pub use url_transcoder::transcode;
