use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::client_addr;

/// Probe traffic is frequent, so it only shows up at debug level.
const QUIET_PATHS: [&str; 2] = ["/health", "/ready"];

pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_addr(&request);
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        warn!(%method, %path, %client, status, duration_ms, "request failed");
    } else if QUIET_PATHS.contains(&path.as_str()) {
        debug!(%method, %path, status, duration_ms, "probe served");
    } else {
        info!(%method, %path, %client, status, duration_ms, "request served");
    }

    response
}
