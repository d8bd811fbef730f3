use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::web::AppState;

/// Health check endpoint
///
/// Reports whether a playlist was published and how many tracks it holds.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "tracks": state.playlist.len(),
        "skipped": state.playlist.skipped,
        "published": state.playlist.path.is_some(),
    }))
}
