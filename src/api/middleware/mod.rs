pub mod auth;
pub mod logging;
pub mod rate_limit;

pub use auth::require_api_key;
pub use logging::request_logger;
pub use rate_limit::{rate_limit, SlidingWindowLimiter};

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};

/// Peer IP when the server was started with connect info, otherwise `"unknown"`.
pub fn client_addr(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
