use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::errors::{WebError, WebResult};
use crate::utils::UrlUtils;
use crate::web::AppState;

/// Default content type when the origin does not send one
const DEFAULT_STREAM_CONTENT_TYPE: &str = "video/mp2t";

#[derive(Debug, Deserialize)]
pub struct StreamPath {
    pub token: String,
    pub user: String,
    pub password: String,
    pub index: String,
}

/// Relay an index-addressed stream request to its origin URI
///
/// The trailing basename is cosmetic and may be absent; only the token,
/// credentials and index select the track.
pub async fn relay_stream(
    State(state): State<AppState>,
    Path(params): Path<StreamPath>,
) -> WebResult<Response> {
    let identity = &state.identity;
    if params.token != identity.anti_collision_token {
        debug!("Unknown relay token '{}'", params.token);
        return Err(WebError::not_found("stream"));
    }
    if !identity.credentials_match(&params.user, &params.password) {
        warn!("Rejected stream request for user '{}'", params.user);
        return Err(WebError::Unauthorized);
    }

    let index: usize = params
        .index
        .parse()
        .map_err(|_| WebError::not_found(format!("track {}", params.index)))?;
    let track = state
        .playlist
        .track(index)
        .ok_or_else(|| WebError::not_found(format!("track {index}")))?;

    let safe_url = UrlUtils::obfuscate_credentials(&track.uri);
    info!("Relaying track {} '{}' from {}", index, track.name, safe_url);

    let response = state.client.get(&track.uri).send().await.map_err(|e| {
        error!("Failed to connect to stream URL {}: {}", safe_url, e.without_url());
        WebError::upstream(format!("failed to connect to origin for track {index}"))
    })?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .map_err(|_| WebError::upstream("origin answered with an invalid status"))?;

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or(DEFAULT_STREAM_CONTENT_TYPE)
        .to_string();

    let content_length: Option<u64> = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|cl| cl.to_str().ok())
        .and_then(|cl| cl.parse().ok());

    debug!(
        "Proxying stream: status={}, content_type={}, content_length={:?}",
        status, content_type, content_length
    );

    let body = Body::from_stream(response.bytes_stream());

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "no-cache");
    if let Some(length) = content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder.body(body).map_err(|e| {
        error!("Failed to build response: {}", e);
        WebError::upstream("failed to build relay response")
    })
}
