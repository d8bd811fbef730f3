use std::fmt;
use std::path::PathBuf;

use tracing::{error, info};

use crate::errors::{SourceError, SourceResult};
use crate::models::Playlist;
use crate::utils::UrlUtils;

pub mod m3u_parser;

pub use m3u_parser::parse_m3u;

/// Where the playlist to relay comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistSource {
    Url(String),
    File(PathBuf),
}

impl PlaylistSource {
    /// `http://` and `https://` sources are fetched, anything else is a local path
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(source.to_string())
        } else {
            Self::File(PathBuf::from(source))
        }
    }
}

impl fmt::Display for PlaylistSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{}", UrlUtils::obfuscate_credentials(url)),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads the source playlist once at startup
pub struct PlaylistLoader {
    client: reqwest::Client,
}

impl Default for PlaylistLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistLoader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn load(&self, source: &PlaylistSource) -> SourceResult<Playlist> {
        info!("Loading playlist from {}", source);

        let content = match source {
            PlaylistSource::Url(url) => self.fetch(url).await?,
            PlaylistSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| SourceError::Read {
                        path: path.clone(),
                        source: e,
                    })?
            }
        };

        let tracks = parse_m3u(&content).map_err(|e| {
            error!("Playlist from {} is not usable: {}", source, e);
            e
        })?;
        info!("Loaded {} tracks from {}", tracks.len(), source);
        Ok(Playlist::new(tracks))
    }

    async fn fetch(&self, url: &str) -> SourceResult<String> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        let fetch_error = |e: reqwest::Error| SourceError::Fetch {
            url: safe_url.clone(),
            source: e.without_url(),
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
            });
        }

        let content = response.text().await.map_err(fetch_error)?;
        info!("Download completed for {}: {} bytes", safe_url, content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_playlist_source_parse() {
        assert_eq!(
            PlaylistSource::parse(" http://origin.example/get.php?type=m3u "),
            PlaylistSource::Url("http://origin.example/get.php?type=m3u".to_string())
        );
        assert_eq!(
            PlaylistSource::parse("HTTPS://origin.example/list.m3u"),
            PlaylistSource::Url("HTTPS://origin.example/list.m3u".to_string())
        );
        assert_eq!(
            PlaylistSource::parse("/srv/iptv/list.m3u"),
            PlaylistSource::File(PathBuf::from("/srv/iptv/list.m3u"))
        );
    }

    #[test]
    fn test_playlist_source_display_hides_credentials() {
        let source =
            PlaylistSource::parse("http://origin.example/get.php?username=user1&password=pass1");
        assert_eq!(
            source.to_string(),
            "http://origin.example/get.php?username=****&password=****"
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"#EXTM3U\n#EXTINF:-1 tvg-id=\"a\",A\nhttp://origin.example/a.ts\n")
            .unwrap();

        let source = PlaylistSource::File(file.path().to_path_buf());
        let playlist = PlaylistLoader::new().load(&source).await.unwrap();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.tracks[0].name, "A");
    }

    async fn spawn_origin() -> std::net::SocketAddr {
        use axum::{Router, http::StatusCode, routing::get};

        let origin = Router::new()
            .route(
                "/get.php",
                get(|| async { "#EXTM3U\n#EXTINF:-1 tvg-id=\"b\",B\nhttp://origin.example/b.ts\n" }),
            )
            .route("/down.m3u", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, origin).await.unwrap();
        });
        addr
    }

    fn direct_loader() -> PlaylistLoader {
        PlaylistLoader::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn test_load_from_url() {
        let addr = spawn_origin().await;
        let source = PlaylistSource::parse(&format!("http://{addr}/get.php?username=u&password=p"));

        let playlist = direct_loader().load(&source).await.unwrap();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.tracks[0].tag("tvg-id"), Some("b"));
    }

    #[tokio::test]
    async fn test_load_from_url_http_error() {
        let addr = spawn_origin().await;
        let source = PlaylistSource::parse(&format!("http://{addr}/down.m3u"));

        let err = direct_loader().load(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let source = PlaylistSource::File(PathBuf::from("/nonexistent/m3u-relay/list.m3u"));
        let err = PlaylistLoader::new().load(&source).await.unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));
    }
}
