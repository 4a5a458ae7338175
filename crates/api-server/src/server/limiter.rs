//! Fixed-window request counters keyed by client address.
//!
//! Each key owns one window. The first hit after a window expires starts a
//! fresh one; hits are counted read-then-increment under a single mutex, so
//! the counts are exact within one process and unshared across processes.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::RateLimitBody;
use tokio::time::Instant;

/// Which response headers advertise the limiter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStyle {
    /// `RateLimit-Limit`, `RateLimit-Remaining`, `RateLimit-Reset` (seconds).
    Standard,
    /// `X-RateLimit-Limit`, `X-RateLimit-Remaining`, `X-RateLimit-Reset` (epoch seconds).
    Legacy,
}

/// Ceiling, window, and rejection payload for one limiter.
#[derive(Debug, Clone)]
pub struct LimitPolicy {
    pub max: u32,
    pub window: Duration,
    /// Responses with status < 400 are refunded after the handler runs.
    pub skip_successful: bool,
    pub code: &'static str,
    pub message: &'static str,
    pub header_style: HeaderStyle,
}

impl LimitPolicy {
    /// Limiter applied to every `/api` request.
    pub fn general(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            skip_successful: false,
            code: "RATE_LIMIT_EXCEEDED",
            message: "Too many requests from this IP, please try again later.",
            header_style: HeaderStyle::Standard,
        }
    }

    /// Stricter limiter for `/api/auth`: 5 failed attempts per 15 minutes.
    pub fn auth() -> Self {
        Self {
            max: 5,
            window: Duration::from_secs(15 * 60),
            skip_successful: true,
            code: "AUTH_RATE_LIMIT_EXCEEDED",
            message: "Too many authentication attempts, please try again later.",
            header_style: HeaderStyle::Legacy,
        }
    }
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_after: Duration,
    },
    Denied {
        limit: u32,
        retry_after: Duration,
    },
}

#[derive(Debug)]
struct Window {
    hits: u32,
    reset_at: Instant,
}

/// A shareable fixed-window limiter.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    policy: Arc<LimitPolicy>,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new(policy: LimitPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    /// Count one request for `key` at `now`.
    pub fn hit(&self, key: &str, now: Instant) -> Decision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = windows.entry(key.to_owned()).or_insert_with(|| Window {
            hits: 0,
            reset_at: now + self.policy.window,
        });
        if now >= window.reset_at {
            window.hits = 0;
            window.reset_at = now + self.policy.window;
        }
        window.hits = window.hits.saturating_add(1);

        let reset_after = window.reset_at.saturating_duration_since(now);
        if window.hits > self.policy.max {
            Decision::Denied {
                limit: self.policy.max,
                retry_after: reset_after,
            }
        } else {
            Decision::Allowed {
                limit: self.policy.max,
                remaining: self.policy.max - window.hits,
                reset_after,
            }
        }
    }

    /// Undo one hit for `key`, used when a request should not count.
    pub fn refund(&self, key: &str) {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(window) = windows.get_mut(key) {
            window.hits = window.hits.saturating_sub(1);
        }
    }

    /// Drop every window that has expired by `now`. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();
        windows.retain(|_, w| w.reset_at > now);
        before - windows.len()
    }

    /// Number of keys with a live window.
    pub fn tracked_keys(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The fixed 429 payload for a denied request.
    pub fn rejection(&self, decision: Decision) -> Response {
        let body = RateLimitBody {
            error: self.policy.message.into(),
            code: self.policy.code.into(),
        };
        let mut resp = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        self.decorate(resp.headers_mut(), decision);
        resp
    }

    /// Attach the limiter headers for `decision`.
    pub fn decorate(&self, headers: &mut HeaderMap, decision: Decision) {
        let (limit, remaining, reset) = match decision {
            Decision::Allowed {
                limit,
                remaining,
                reset_after,
            } => (limit, remaining, reset_after),
            Decision::Denied { limit, retry_after } => {
                headers.insert(
                    axum::http::header::RETRY_AFTER,
                    HeaderValue::from(ceil_secs(retry_after)),
                );
                (limit, 0, retry_after)
            }
        };

        let (limit_name, remaining_name, reset_name, reset_value) = match self.policy.header_style {
            HeaderStyle::Standard => (
                "ratelimit-limit",
                "ratelimit-remaining",
                "ratelimit-reset",
                ceil_secs(reset),
            ),
            HeaderStyle::Legacy => (
                "x-ratelimit-limit",
                "x-ratelimit-remaining",
                "x-ratelimit-reset",
                epoch_secs_after(reset),
            ),
        };
        headers.insert(HeaderName::from_static(limit_name), HeaderValue::from(limit));
        headers.insert(
            HeaderName::from_static(remaining_name),
            HeaderValue::from(remaining),
        );
        headers.insert(
            HeaderName::from_static(reset_name),
            HeaderValue::from(reset_value),
        );
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

fn epoch_secs_after(d: Duration) -> u64 {
    let now = chrono::Utc::now().timestamp().max(0).unsigned_abs();
    now + ceil_secs(d)
}
