//! Per-client fixed-window rate limiting for the render endpoints.
//!
//! A TTL map over client addresses: each entry holds a request count and the
//! window start. Expired entries are swept by a periodic background task, but
//! every read re-checks expiry against the current time, so an entry that is
//! logically expired but not yet swept is treated as expired. Rejected
//! requests are answered immediately with a retry signal; nothing queues.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Fixed window length. One minute, matching the configured per-minute cap.
const WINDOW: Duration = Duration::from_secs(60);

/// Interval between opportunistic sweeps of expired windows.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Window {
    count: u32,
    started_at: Instant,
}

impl Window {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.started_at) >= WINDOW
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

/// Shared fixed-window limiter keyed by client address.
pub struct RateLimiter {
    cap: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(cap: u32) -> Self {
        Self {
            cap,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Count a request against the client's current window.
    ///
    /// Expiry is always evaluated against `now` rather than trusting the
    /// sweeper, so the check stays correct between sweeps.
    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut windows = self.windows.lock().unwrap();

        let window = windows.entry(client.to_string()).or_insert(Window {
            count: 0,
            started_at: now,
        });

        if window.is_expired(now) {
            window.count = 0;
            window.started_at = now;
        }

        if window.count >= self.cap {
            let elapsed = now.duration_since(window.started_at);
            let retry_after_secs = WINDOW.saturating_sub(elapsed).as_secs().max(1);
            return Decision::Limited { retry_after_secs };
        }

        window.count += 1;
        Decision::Allowed {
            remaining: self.cap - window.count,
        }
    }

    /// Drop expired windows. Correctness does not depend on this running;
    /// it only bounds the map's memory.
    pub fn sweep(&self) {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap();
        let before = windows.len();
        windows.retain(|_, w| !w.is_expired(now));
        let evicted = before - windows.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = windows.len(), "Rate limiter sweep");
        }
    }

    /// Spawn the periodic sweeper. Called once by the server entry point.
    pub fn spawn_sweeper(self: &Arc<Self>) {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                limiter.sweep();
            }
        });
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

/// Axum middleware applying the shared limiter to the render routes.
///
/// The client key is the first `X-Forwarded-For` entry when present (the
/// service runs behind a proxy on the managed platform), else the peer
/// address of the connection.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client) {
        Decision::Allowed { remaining } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            if let Ok(v) = HeaderValue::from_str(&limiter.cap().to_string()) {
                headers.insert("X-RateLimit-Limit", v);
            }
            if let Ok(v) = HeaderValue::from_str(&remaining.to_string()) {
                headers.insert("X-RateLimit-Remaining", v);
            }
            response
        }
        Decision::Limited { retry_after_secs } => {
            tracing::debug!(client = %client, "Render request over rate limit");
            ApiError::RateLimited {
                retry_after_secs,
                limit: limiter.cap(),
            }
            .into_response()
        }
    }
}

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
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_cap_then_limits() {
        let limiter = RateLimiter::new(3);
        assert_eq!(limiter.check("10.0.0.1"), Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.check("10.0.0.1"), Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.check("10.0.0.1"), Decision::Allowed { remaining: 0 });
        assert!(matches!(
            limiter.check("10.0.0.1"),
            Decision::Limited { retry_after_secs } if retry_after_secs >= 1 && retry_after_secs <= 60
        ));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1);
        assert!(matches!(limiter.check("10.0.0.1"), Decision::Allowed { .. }));
        assert!(matches!(limiter.check("10.0.0.1"), Decision::Limited { .. }));
        // A different address in the same window is unaffected
        assert!(matches!(limiter.check("10.0.0.2"), Decision::Allowed { .. }));
    }

    #[test]
    fn test_sweep_only_evicts_expired() {
        let limiter = RateLimiter::new(5);
        limiter.check("10.0.0.1");
        limiter.check("10.0.0.2");
        assert_eq!(limiter.tracked_clients(), 2);

        limiter.sweep();
        // Fresh windows survive the sweep
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_expired_window_resets_on_read() {
        let limiter = RateLimiter::new(1);
        let start = Instant::now();
        assert!(matches!(
            limiter.check_at("10.0.0.1", start),
            Decision::Allowed { .. }
        ));
        assert!(matches!(
            limiter.check_at("10.0.0.1", start),
            Decision::Limited { .. }
        ));

        // Logically expired but not yet swept: the read must treat it as a
        // fresh window instead of trusting the sweeper.
        let after_expiry = start + WINDOW + Duration::from_secs(1);
        assert_eq!(
            limiter.check_at("10.0.0.1", after_expiry),
            Decision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let request = Request::builder()
            .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "203.0.113.9");
    }

    #[test]
    fn test_client_key_without_any_source() {
        let request = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(client_key(&request), "unknown");
    }
}
