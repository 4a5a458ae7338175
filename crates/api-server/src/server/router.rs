//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{HeaderValue, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};
use uuid::Uuid;

use super::middleware::{body, cors, logging, rate_limit, security, BODY_LIMIT, REQUEST_TIMEOUT};
use super::{handlers, routes, state::AppState};

/// Fresh v4 UUID per request for the `x-request-id` header.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Layers are listed outermost first; see [`super::middleware`] for the order.
pub fn build(state: AppState) -> Router {
    let development = state.config.is_development();
    let static_files = ServeDir::new(&state.config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(handlers::spa_shell.with_state(state.clone()));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", routes::api_router(&state))
        .fallback_service(static_files)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(from_fn_with_state(state.clone(), security::apply_security_headers))
                .layer(from_fn_with_state(state.clone(), rate_limit::limit_api))
                .layer(from_fn_with_state(state.clone(), cors::enforce_origin))
                .layer(cors::create_cors_layer(&state.config))
                .layer(from_fn_with_state(state.clone(), logging::log_requests))
                .layer(logging::create_trace_layer(development))
                .layer(CatchPanicLayer::custom(handlers::panic_response))
                .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(BODY_LIMIT))
                .layer(from_fn(body::capture_raw_body)),
        )
        .with_state(state)
}
