use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatQueryRequest {
    pub query: String,
}

/// Answers one user query. Conversation failures surface as text in the
/// response body with HTTP 200; the UI renders whatever string comes
/// back.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatQueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = request.query.trim().to_string();
    if query.is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    state.transcript.push(query.clone(), true).await;

    let profile = state.agent.active().await?;
    let started = Instant::now();
    let response = render_response(state.convo.chat(&query, &profile).await);
    let elapsed = started.elapsed();

    state.transcript.push(response.clone(), false).await;
    tracing::info!(
        target: "query",
        "Query: {} | Response: {} | Time: {:.2}s",
        query,
        response,
        elapsed.as_secs_f64()
    );

    Ok(Json(json!({
        "response": response,
        "elapsed_ms": elapsed.as_millis() as u64,
    })))
}

fn render_response(result: Result<String, ApiError>) -> String {
    match result {
        Ok(text) => text,
        Err(err) => format!("Error processing query: {}", err),
    }
}
