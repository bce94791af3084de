use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sliding window rate limit state shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    inner: Arc<Mutex<RateLimitInner>>,
}

struct RateLimitInner {
    /// Map from client key -> list of request timestamps.
    requests: HashMap<String, Vec<Instant>>,
    /// Maximum requests allowed within the window.
    max_requests: u32,
    /// Sliding window duration.
    window: Duration,
}

impl RateLimitState {
    /// Create rate limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimitInner {
                requests: HashMap::new(),
                max_requests,
                window,
            })),
        }
    }

    /// Check if a request from `key` is allowed. Returns true if allowed.
    fn check(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();
        let cutoff = now - inner.window;
        let max = inner.max_requests;

        let timestamps = inner.requests.entry(key.to_string()).or_default();
        timestamps.retain(|t| *t > cutoff);

        if timestamps.len() as u32 >= max {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Derive the client key: the forwarded client address when behind a
/// proxy, falling back to the bearer token holder, then to a shared
/// bucket.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

/// Axum middleware that enforces the sliding-window limit per client.
pub async fn rate_limit_middleware(
    axum::extract::State(state): axum::extract::State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if !state.check(&key) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "Too many requests, please try again later."
            })),
        )
            .into_response();
    }

    next.run(request).await
}

use axum::response::IntoResponse;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_blocks() {
        let state = RateLimitState::new(3, Duration::from_secs(60));
        assert!(state.check("client-a"));
        assert!(state.check("client-a"));
        assert!(state.check("client-a"));
        assert!(!state.check("client-a"));
    }

    #[test]
    fn keys_are_independent() {
        let state = RateLimitState::new(1, Duration::from_secs(60));
        assert!(state.check("client-a"));
        assert!(!state.check("client-a"));
        assert!(state.check("client-b"));
    }

    #[test]
    fn window_expiry_frees_budget() {
        let state = RateLimitState::new(1, Duration::from_millis(10));
        assert!(state.check("client-a"));
        assert!(!state.check("client-a"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(state.check("client-a"));
    }
}
