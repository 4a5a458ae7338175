//! Per-client rate limiting for `/api` and the stricter `/api/auth` group.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;
use tracing::warn;

use crate::server::limiter::{Decision, RateLimiter};
use crate::server::state::AppState;

/// General limiter, scoped to `/api` and everything beneath it.
pub async fn limit_api(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    if request.method() == Method::OPTIONS || !is_api_path(request.uri().path()) {
        return next.run(request).await;
    }
    enforce(&state.limits.general, state.config.trust_proxy, request, next).await
}

/// Auth limiter. Mounted as a route layer on the auth group only, so it runs
/// after (in addition to) the general limiter.
pub async fn limit_auth(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }
    enforce(&state.limits.auth, state.config.trust_proxy, request, next).await
}

async fn enforce(
    limiter: &RateLimiter,
    trust_proxy: bool,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request, trust_proxy);
    let decision = limiter.hit(&key, Instant::now());

    if let Decision::Denied { retry_after, .. } = decision {
        warn!(
            client = %key,
            code = limiter.policy().code,
            retry_after_secs = retry_after.as_secs(),
            "rate limit exceeded"
        );
        return limiter.rejection(decision);
    }

    let mut response = next.run(request).await;
    if limiter.policy().skip_successful && response.status().as_u16() < 400 {
        limiter.refund(&key);
    }
    limiter.decorate(response.headers_mut(), decision);
    response
}

/// `true` for `/api` and any path below it.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Identify the client for counting purposes.
///
/// Behind one trusted proxy the right-most `X-Forwarded-For` hop is the
/// address that proxy saw; otherwise the socket peer is used.
pub fn client_key(request: &Request<Body>, trust_proxy: bool) -> String {
    client_addr(request, trust_proxy).unwrap_or_else(|| "unknown".into())
}

/// The client address [`client_key`] is derived from, if one is known.
pub fn client_addr(request: &Request<Body>, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let forwarded = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').map(str::trim).find(|hop| !hop.is_empty()));
        if let Some(hop) = forwarded {
            return Some(hop.to_owned());
        }
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}
