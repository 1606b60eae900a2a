use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::agent::AgentProfile;
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateAgentRequest {
    pub model: String,
    #[serde(default)]
    pub system_message: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
}

pub async fn get_agent(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let profile = state.agent.active().await?;
    Ok(Json(profile))
}

/// Model switch. Omitted fields keep their current values; the stored
/// row is replaced wholesale.
pub async fn update_agent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateAgentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.model.trim().is_empty() {
        return Err(ApiError::BadRequest("model must not be empty".to_string()));
    }

    let current = state.agent.active().await?;
    let profile = AgentProfile {
        model: request.model.trim().to_string(),
        system_message: request.system_message.unwrap_or(current.system_message),
        user_name: request.user_name.unwrap_or(current.user_name),
        agent_name: request.agent_name.unwrap_or(current.agent_name),
    };
    state.agent.replace(&profile).await?;

    tracing::info!("Agent model switched to {}", profile.model);
    Ok(Json(profile))
}
