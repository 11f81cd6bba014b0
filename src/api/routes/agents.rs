use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use super::chat::{chat_reply, ChatRequest, ChatResponse};
use crate::api::error::{ApiError, ApiJson};
use crate::api::state::AppState;
use crate::domain::{AgentInfo, DEFAULT_AGENT_ID};

fn known_agent(agent_id: &str) -> Result<(), ApiError> {
    if agent_id == DEFAULT_AGENT_ID {
        Ok(())
    } else {
        Err(ApiError::NotFound("Agent not found".to_string()))
    }
}

pub async fn list_agents(State(state): State<AppState>) -> Json<Value> {
    let agents = vec![state.agent_info()];
    Json(json!({ "total": agents.len(), "agents": agents }))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentInfo>, ApiError> {
    known_agent(&agent_id)?;
    Ok(Json(state.agent_info()))
}

pub async fn agent_chat(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    body: Result<ApiJson<ChatRequest>, ApiError>,
) -> Result<Json<ChatResponse>, ApiError> {
    known_agent(&agent_id)?;
    let ApiJson(request) = body?;
    chat_reply(&state, request, agent_id).await
}
