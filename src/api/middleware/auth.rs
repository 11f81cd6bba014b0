use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::client_addr;
use crate::api::{error::ApiError, state::AppState};

/// Accepts `Authorization: Bearer <key>` or `X-API-Key: <key>`.
/// Passes everything through when no key is configured.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.security.api_key.as_deref() else {
        return next.run(request).await;
    };

    if presented_keys(request.headers()).any(|key| keys_match(key, expected)) {
        return next.run(request).await;
    }

    warn!(
        path = %request.uri().path(),
        client = %client_addr(&request),
        "unauthorized access attempt"
    );
    ApiError::Unauthorized.into_response()
}

fn presented_keys(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let api_key = headers.get("X-API-Key").and_then(|v| v.to_str().ok());
    bearer.into_iter().chain(api_key)
}

/// Compares without short-circuiting on the first differing byte.
fn keys_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
