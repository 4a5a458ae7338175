//! Origin allow-list enforcement and CORS response headers.
//!
//! `tower-http`'s [`CorsLayer`] only decorates responses; a disallowed origin
//! would still reach the handler. [`enforce_origin`] runs first and turns such
//! requests into an error envelope.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::debug;

use crate::config::Config;
use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Reject requests whose `Origin` is present but not allow-listed.
pub async fn enforce_origin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(origin) = request.headers().get(header::ORIGIN) else {
        return next.run(request).await;
    };

    let origin = origin.to_str().unwrap_or_default();
    if state.origins.iter().any(|allowed| allowed == origin) {
        return next.run(request).await;
    }

    debug!(%origin, path = %request.uri().path(), "origin rejected");
    ApiError::cors_rejected(origin)
        .with_path(request.uri().path())
        .into_response()
}

/// Build the response-side CORS layer for the allow-listed origins.
pub fn create_cors_layer(config: &Config) -> CorsLayer {
    let origins = config
        .allowed_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::HeaderName::from_static("x-requested-with"),
        ]))
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}
