use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use std::net::SocketAddr;
use tempfile::TempDir;
use tower::ServiceExt;

use m3u_relay::{
    config::Config,
    models::{RewrittenPlaylist, Track},
    proxy::ProxyIdentity,
    web::{AppState, create_router},
};

const PLAYLIST_BODY: &str =
    "#EXTM3U\n#EXTINF:-1 , Channel 1\nhttp://relay.local:8080/ab12/alice/secret/0/1.ts\n";

// Helper function to send requests to the app
async fn send_request(app: &Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(str::to_string);

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, content_type, body_bytes.to_vec())
}

fn identity(custom_endpoint: Option<&str>) -> ProxyIdentity {
    let mut config = Config::default();
    config.credentials.user = "alice".to_string();
    config.credentials.password = "secret".to_string();
    config.web.hostname = "relay.local".to_string();
    config.web.custom_endpoint = custom_endpoint.map(str::to_string);
    ProxyIdentity::from_config(&config).with_anti_collision_token("ab12")
}

/// A relay whose single track points at `origin_uri`, with the playlist
/// persisted in `dir`
fn app(dir: &TempDir, origin_uri: &str, custom_endpoint: Option<&str>) -> Router {
    let path = dir.path().join("relay.m3u");
    std::fs::write(&path, PLAYLIST_BODY).unwrap();

    let playlist = RewrittenPlaylist {
        tracks: vec![Track::new("Channel 1", -1, Vec::new(), origin_uri)],
        path: Some(path),
        skipped: 0,
        bytes_written: PLAYLIST_BODY.len() as u64,
    };
    create_router(AppState::new(playlist, identity(custom_endpoint)).with_client(direct_client()))
}

/// Client that never routes through an environment proxy
fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Minimal origin serving one stream segment and a 404 for anything else
async fn spawn_origin() -> SocketAddr {
    let origin = Router::new().route(
        "/live/{file}",
        get(|| async { ([(header::CONTENT_TYPE, "video/mp2t")], "segment-bytes") }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, origin).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, "http://origin.example/1.ts", None);

    let (status, _, body) = send_request(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["tracks"], 1);
    assert_eq!(json["published"], true);
}

#[tokio::test]
async fn test_playlist_requires_relay_credentials() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, "http://origin.example/1.ts", None);

    for uri in [
        "/iptv.m3u",
        "/iptv.m3u?username=alice",
        "/iptv.m3u?username=alice&password=wrong",
        "/iptv.m3u?username=user1&password=pass1",
    ] {
        let (status, _, _) = send_request(&app, uri).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, content_type, body) =
        send_request(&app, "/iptv.m3u?username=alice&password=secret").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("audio/x-mpegurl"));
    assert_eq!(String::from_utf8(body).unwrap(), PLAYLIST_BODY);
}

#[tokio::test]
async fn test_unpublished_playlist_is_not_found() {
    let app = create_router(AppState::new(RewrittenPlaylist::default(), identity(None)));

    let (status, _, body) = send_request(&app, "/iptv.m3u?username=alice&password=secret").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_stream_is_relayed_from_origin() {
    let origin = spawn_origin().await;
    let dir = TempDir::new().unwrap();
    let app = app(&dir, &format!("http://{origin}/live/1.ts"), None);

    let (status, content_type, body) = send_request(&app, "/ab12/alice/secret/0/1.ts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("video/mp2t"));
    assert_eq!(body, b"segment-bytes");

    // origins without a file name produce relay URLs ending at the index
    let (status, _, _) = send_request(&app, "/ab12/alice/secret/0").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_origin_status_is_forwarded() {
    let origin = spawn_origin().await;
    let dir = TempDir::new().unwrap();
    let app = app(&dir, &format!("http://{origin}/gone/1.ts"), None);

    let (status, _, _) = send_request(&app, "/ab12/alice/secret/0/1.ts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_origin_is_bad_gateway() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, "http://127.0.0.1:1/live/1.ts", None);

    let (status, _, _) = send_request(&app, "/ab12/alice/secret/0/1.ts").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_stream_request_validation() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, "http://origin.example/1.ts", None);

    let cases = [
        ("/ffff/alice/secret/0/1.ts", StatusCode::NOT_FOUND),
        ("/ab12/alice/wrong/0/1.ts", StatusCode::UNAUTHORIZED),
        ("/ab12/alice/secret/1/1.ts", StatusCode::NOT_FOUND),
        ("/ab12/alice/secret/-1/1.ts", StatusCode::NOT_FOUND),
        ("/ab12/alice/secret/abc/1.ts", StatusCode::NOT_FOUND),
    ];
    for (uri, expected) in cases {
        let (status, _, _) = send_request(&app, uri).await;
        assert_eq!(status, expected, "{uri}");
    }
}

#[tokio::test]
async fn test_routes_nest_under_custom_endpoint() {
    let dir = TempDir::new().unwrap();
    let app = app(&dir, "http://origin.example/1.ts", Some("/tv/live/"));

    let (status, _, _) = send_request(&app, "/tv/live/iptv.m3u?username=alice&password=secret").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send_request(&app, "/tv/live/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send_request(&app, "/iptv.m3u?username=alice&password=secret").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
