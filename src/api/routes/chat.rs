use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::{ApiError, ApiJson};
use crate::api::state::AppState;
use crate::domain::DomainError;

pub const MAX_QUESTION_CHARS: usize = 2000;

#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
    pub agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct AskQuery {
    pub question: Option<String>,
}

/// Shared by `/chat`, `/run` and `/agents/{id}/chat`.
pub(crate) async fn run_chat(
    state: &AppState,
    message: &str,
    session_id: Option<&str>,
) -> Result<String, ApiError> {
    let conversation = state
        .conversation
        .as_ref()
        .ok_or(ApiError::AgentUnavailable)?;

    let message = message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Missing 'message'".to_string()));
    }

    let session_id = session_id.map(str::trim).filter(|s| !s.is_empty());
    conversation
        .respond(message, session_id)
        .await
        .map_err(agent_failure)
}

/// Only a timeout keeps its own status; any other agent failure is a 500.
fn agent_failure(e: DomainError) -> ApiError {
    match e {
        DomainError::Timeout(_) => ApiError::Domain(e),
        other => ApiError::AgentFailed(other.to_string()),
    }
}

/// Whole seconds, rounded up so sub-second deadlines never read as 0.
fn timeout_secs(timeout: std::time::Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

pub(crate) async fn chat_reply(
    state: &AppState,
    request: ChatRequest,
    agent: String,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = run_chat(state, &request.message, request.session_id.as_deref()).await?;
    Ok(Json(ChatResponse {
        response,
        status: "success",
        agent,
        session_id: request.session_id,
    }))
}

pub async fn chat_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let agent = state.agent_name().to_string();
    chat_reply(&state, request, agent).await
}

pub async fn chat_query(
    State(state): State<AppState>,
    Query(request): Query<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let agent = state.agent_name().to_string();
    chat_reply(&state, request, agent).await
}

pub async fn run_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RunRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let response = run_chat(&state, &request.prompt, None).await?;
    Ok(Json(json!({ "response": response })))
}

fn validate_question(question: Option<&str>) -> Result<&str, ApiError> {
    let question = question.unwrap_or_default();
    let chars = question.chars().count();
    if chars == 0 {
        return Err(ApiError::Unprocessable(
            "question: field required and must not be empty".to_string(),
        ));
    }
    if chars > MAX_QUESTION_CHARS {
        return Err(ApiError::Unprocessable(format!(
            "question: at most {MAX_QUESTION_CHARS} characters"
        )));
    }
    Ok(question)
}

/// Single-shot question. Needs both the agent and the database.
pub async fn ask(State(state): State<AppState>, Query(query): Query<AskQuery>) -> Response {
    let question = match validate_question(query.question.as_deref()) {
        Ok(q) => q,
        Err(e) => return e.into_response(),
    };

    let conversation = match (&state.conversation, state.db_connected) {
        (Some(conversation), true) => conversation,
        _ => {
            tracing::warn!("ask called but agent not initialized");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": "Agent not initialized",
                    "details": "Database or model unavailable",
                })),
            )
                .into_response();
        }
    };

    let preview: String = question.chars().take(100).collect();
    tracing::info!(question = %preview, "processing question");

    match conversation.respond(question, None).await {
        Ok(answer) => {
            tracing::info!("question processed");
            Json(json!({ "answer": answer })).into_response()
        }
        Err(DomainError::Timeout(_)) => {
            tracing::error!("agent processing timed out");
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({
                    "error": "Agent processing timed out",
                    "timeout": timeout_secs(state.config.agent.timeout),
                })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "agent processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Agent processing failed", "type": e.kind() })),
            )
                .into_response()
        }
    }
}
