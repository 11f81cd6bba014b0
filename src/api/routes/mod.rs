pub mod agents;
pub mod chat;
pub mod health;
pub mod knowledge;

use std::sync::Arc;

use axum::http::{header, HeaderName, Method};
use axum::{
    middleware,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::middleware::{rate_limit, request_logger, require_api_key, SlidingWindowLimiter};
use crate::api::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.security.cors_origins);
    let limits = &state.config.rate_limit;
    let probe_budget = limits.health_per_minute;
    let ask_limiter = Arc::new(SlidingWindowLimiter::per_minute(limits.ask_per_minute));

    Router::new()
        .merge(public_routes(probe_budget))
        .merge(protected_routes(state.clone(), ask_limiter))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Never behind the API key. `/health` and `/ready` each get their own budget.
fn public_routes(probe_budget: u32) -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/connect", get(health::connect))
        .merge(rate_limited("/health", get(health::health_check), probe_budget))
        .merge(rate_limited("/ready", get(health::readiness_check), probe_budget))
}

fn rate_limited(path: &str, route: MethodRouter<AppState>, per_minute: u32) -> Router<AppState> {
    let limiter = Arc::new(SlidingWindowLimiter::per_minute(per_minute));
    Router::new()
        .route(path, route)
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit))
}

fn protected_routes(state: AppState, ask_limiter: Arc<SlidingWindowLimiter>) -> Router<AppState> {
    let ask = Router::new()
        .route("/ask", get(chat::ask).post(chat::ask))
        .route_layer(middleware::from_fn_with_state(ask_limiter, rate_limit));

    Router::new()
        .route("/chat", get(chat::chat_query).post(chat::chat_handler))
        .route("/run", post(chat::run_handler))
        .route("/agents", get(agents::list_agents))
        .route("/agents/{agent_id}", get(agents::get_agent))
        .route("/agents/{agent_id}/chat", post(agents::agent_chat))
        .route("/knowledge", post(knowledge::ingest))
        .route("/knowledge/search", post(knowledge::search))
        .route("/knowledge/{id}", delete(knowledge::delete_document))
        .merge(ask)
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}
