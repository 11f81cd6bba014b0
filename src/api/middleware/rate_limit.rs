use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::time::Instant;
use tracing::warn;

use super::client_addr;
use crate::api::error::ApiError;

/// Per-client sliding-window request counter.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit: limit as usize,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Records a hit for `client` and reports whether it is within budget.
    /// A limit of 0 disables limiting.
    pub fn check(&self, client: &str) -> bool {
        if self.limit == 0 {
            return true;
        }

        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());

        hits.retain(|_, q| {
            while q.front().is_some_and(|t| now.duration_since(*t) >= self.window) {
                q.pop_front();
            }
            !q.is_empty()
        });

        let queue = hits.entry(client.to_string()).or_default();
        if queue.len() >= self.limit {
            return false;
        }
        queue.push_back(now);
        true
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<SlidingWindowLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_addr(&request);
    if !limiter.check(&client) {
        warn!(client = %client, path = %request.uri().path(), "rate limit exceeded");
        return ApiError::RateLimited.into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_budget_per_client_and_window_slides() {
        let limiter = SlidingWindowLimiter::per_minute(2);

        assert!(limiter.check("a"));
        assert!(limiter.check("a"));
        assert!(!limiter.check("a"));
        assert!(limiter.check("b"));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(limiter.check("a"));
    }

    #[tokio::test]
    async fn test_zero_limit_disables() {
        let limiter = SlidingWindowLimiter::per_minute(0);
        for _ in 0..100 {
            assert!(limiter.check("a"));
        }
    }
}
