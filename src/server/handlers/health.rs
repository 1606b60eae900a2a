use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

pub async fn health(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let chunks = state.store.count().await.unwrap_or(0);
    let profile = state.agent.active().await?;
    let ollama_reachable = state.provider.health_check().await.unwrap_or(false);
    let uptime_secs = (chrono::Utc::now() - state.started_at).num_seconds();

    Ok(Json(json!({
        "status": "ok",
        "model": profile.model,
        "chunks": chunks,
        "transcript_turns": state.transcript.len().await,
        "ollama_reachable": ollama_reachable,
        "uptime_secs": uptime_secs,
    })))
}
