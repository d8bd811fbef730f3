use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::{WebError, WebResult};
use crate::web::AppState;

pub const PLAYLIST_CONTENT_TYPE: &str = "audio/x-mpegurl";

#[derive(Debug, Default, Deserialize)]
pub struct PlaylistQuery {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Serve the persisted playlist to clients holding the relay credentials
pub async fn serve_playlist(
    State(state): State<AppState>,
    Query(query): Query<PlaylistQuery>,
) -> WebResult<Response> {
    let username = query.username.unwrap_or_default();
    let password = query.password.unwrap_or_default();
    if !state.identity.credentials_match(&username, &password) {
        warn!("Rejected playlist request for user '{}'", username);
        return Err(WebError::Unauthorized);
    }

    let Some(path) = state.playlist.path.as_ref() else {
        return Err(WebError::not_found("playlist"));
    };

    let content = tokio::fs::read(path).await.map_err(|e| {
        error!("Failed to read published playlist {}: {}", path.display(), e);
        WebError::not_found("playlist")
    })?;

    info!("Serving playlist ({} bytes) to '{}'", content.len(), username);
    Ok(([(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)], content).into_response())
}
