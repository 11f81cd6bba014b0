mod common;

use agentos::api::{create_router, AppState};
use agentos::infrastructure::AppConfig;
use axum::http::StatusCode;
use common::{get, health, ready_state, send};

#[tokio::test]
async fn test_health_all_up_is_healthy() {
    let app = create_router(ready_state(AppConfig::default()));

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["db"], "ok");
    assert_eq!(body["ollama"], "ok");
    assert_eq!(body["agent"], "ready");
}

#[tokio::test]
async fn test_health_one_down_is_degraded_but_ok() {
    let state = AppState::new(AppConfig::default(), health(false, true));
    let app = create_router(state);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db"], "fail");
    assert_eq!(body["agent"], "error");
}

#[tokio::test]
async fn test_health_both_down_is_503() {
    let state = AppState::new(AppConfig::default(), health(false, false));
    let app = create_router(state);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn test_ready_requires_both_dependencies() {
    let app = create_router(ready_state(AppConfig::default()));
    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);

    let app = create_router(AppState::new(AppConfig::default(), health(true, false)));
    let (status, body) = send(&app, get("/ready")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["ready"], false);
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = create_router(ready_state(AppConfig::default()));

    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["service"], "VBoarder API");
    assert!(body["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "/ask"));
}

#[tokio::test]
async fn test_connect_reports_client_and_security() {
    let app = create_router(ready_state(common::with_key("k")));

    let (status, body) = send(&app, get("/connect")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "connected");
    assert_eq!(body["client"], "unknown");
    assert_eq!(body["secure"], true);
    assert_eq!(body["db"], "ok");
    assert_eq!(body["model"], "mistral:latest");
}

#[tokio::test]
async fn test_probe_routes_have_separate_budgets() {
    let mut config = AppConfig::default();
    config.rate_limit.health_per_minute = 1;
    let app = create_router(ready_state(config));

    assert_eq!(send(&app, get("/health")).await.0, StatusCode::OK);
    assert_eq!(send(&app, get("/ready")).await.0, StatusCode::OK);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["detail"], "Rate limit exceeded");
    assert_eq!(send(&app, get("/ready")).await.0, StatusCode::TOO_MANY_REQUESTS);

    // the root route is not limited
    assert_eq!(send(&app, get("/")).await.0, StatusCode::OK);
}
