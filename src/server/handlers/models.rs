use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

pub async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let models = state.catalog.list().await;
    Json(json!({ "models": models }))
}

pub async fn refresh_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let models = state.catalog.refresh().await;
    Json(json!({ "models": models }))
}
