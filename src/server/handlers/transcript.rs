use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn get_transcript(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "turns": state.transcript.all().await }))
}

pub async fn clear_transcript(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cleared = state.transcript.clear().await;
    tracing::info!("Cleared {} transcript turns", cleared);
    Json(json!({ "cleared": cleared }))
}
