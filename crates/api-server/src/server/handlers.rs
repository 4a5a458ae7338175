//! Axum request handlers for the fixed endpoints, the SPA fallback, and the
//! terminal not-found / panic stages.

use std::any::Any;

use axum::{
    body::Body,
    extract::{OriginalUri, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use common::protocol::{ApiIndex, HealthResponse, SERVICE_NAME};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::error::ApiError;
use super::middleware::rate_limit::is_api_path;
use super::state::AppState;
use crate::telemetry::panic_message;

/// `GET /health` — liveness probe with database connection state.
///
/// Always `200 OK` while the process answers; a disconnected database is
/// reported in the body, not the status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        environment: state.config.node_env.clone(),
        database: state.db.state().into(),
    })
}

/// `GET /api` — directory of the available endpoint prefixes.
pub async fn api_index() -> Json<ApiIndex> {
    Json(ApiIndex::current(env!("CARGO_PKG_VERSION")))
}

/// SPA fallback: any GET/HEAD outside `/api` receives the shell document.
///
/// Reached only after static lookup misses. API paths and other methods
/// continue to the not-found stage.
pub async fn spa_shell(State(state): State<AppState>, request: Request) -> Response {
    let uri = request.uri().clone();
    if is_api_path(uri.path()) || !matches!(*request.method(), Method::GET | Method::HEAD) {
        return ApiError::not_found(&uri).into_response();
    }

    let response = match ServeFile::new(state.config.spa_index_path()).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.status() == StatusCode::NOT_FOUND {
        return ApiError::not_found(&uri).into_response();
    }
    response.map(Body::new)
}

/// Terminal not-found stage. Reports the path as the client sent it, even
/// from inside a nested router.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::not_found(&uri)
}

/// Convert a caught handler panic into the error envelope.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::internal(format!("handler panicked: {}", panic_message(payload.as_ref())))
        .into_response()
}
