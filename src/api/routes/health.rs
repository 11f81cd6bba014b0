use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::api::middleware::client_addr;
use crate::api::state::AppState;

pub const ENDPOINTS: [&str; 9] = [
    "/health",
    "/ready",
    "/connect",
    "/ask",
    "/chat",
    "/run",
    "/agents",
    "/agents/{agent_id}/chat",
    "/knowledge",
];

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db: &'static str,
    pub ollama: &'static str,
    pub agent: &'static str,
    pub version: &'static str,
}

pub async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "service": format!("{} API", state.agent_name()),
        "endpoints": ENDPOINTS,
    }))
}

/// Answers 503 only when both dependencies are down.
pub async fn health_check(State(state): State<AppState>) -> Response {
    tracing::debug!("health check requested");
    let health = state.health.check().await;

    let status = if health.all_up() {
        "healthy"
    } else if health.all_down() {
        "unhealthy"
    } else {
        "degraded"
    };

    let body = HealthResponse {
        status,
        db: health.db_label(),
        ollama: health.llm_label(),
        agent: if state.agent_ready() { "ready" } else { "error" },
        version: env!("CARGO_PKG_VERSION"),
    };

    let code = if health.all_down() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    (code, Json(body)).into_response()
}

pub async fn readiness_check(State(state): State<AppState>) -> Response {
    let ready = state.health.check().await.all_up();
    let code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(json!({ "ready": ready }))).into_response()
}

/// Lets a control plane confirm reachability and whether auth is on.
pub async fn connect(State(state): State<AppState>, request: Request) -> Json<serde_json::Value> {
    Json(json!({
        "status": "connected",
        "client": client_addr(&request),
        "agent": state.agent_name(),
        "model": state.config.llm.model,
        "secure": state.config.auth_enabled(),
        "db": if state.db_connected { "ok" } else { "error" },
    }))
}
