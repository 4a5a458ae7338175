//! `/api/auth` — login, signup, logout.
//!
//! Credentials are validated for shape only; no account store sits behind
//! these handlers yet.

use axum::{
    http::StatusCode,
    routing::{any, post},
    Json, Router,
};
use common::auth::{LoginRequest, SignupRequest, ValidationError};
use common::protocol::{AuthResponse, AuthUser};
use tracing::{debug, info};

use crate::server::error::{ApiError, ApiResult};
use crate::server::handlers;
use crate::server::middleware::Payload;
use crate::server::state::AppState;

/// Identity returned by a successful login until accounts are persisted.
pub const DEMO_DISPLAY_NAME: &str = "John Doe";

/// Auth routes, relative to `/api/auth`. Every other path under the group
/// still ends in the not-found envelope.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login).fallback(handlers::not_found))
        .route("/signup", post(signup).fallback(handlers::not_found))
        .route("/logout", post(logout).fallback(handlers::not_found))
        .route("/", any(handlers::not_found))
        .route("/*rest", any(handlers::not_found))
}

/// `POST /api/auth/login`
pub async fn login(payload: Payload<LoginRequest>) -> ApiResult<Json<AuthResponse>> {
    payload.data.validate().map_err(rejected)?;
    info!(raw_len = payload.raw.len(), "login accepted");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful!".into(),
        user: Some(AuthUser {
            display_name: DEMO_DISPLAY_NAME.into(),
        }),
    }))
}

/// `POST /api/auth/signup`
pub async fn signup(
    payload: Payload<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let form = payload.data;
    form.validate().map_err(rejected)?;
    info!(raw_len = payload.raw.len(), "signup accepted");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "Account created successfully!".into(),
            user: Some(AuthUser {
                display_name: form.display_name(),
            }),
        }),
    ))
}

/// `POST /api/auth/logout` — stateless; the client clears its own session.
pub async fn logout() -> Json<AuthResponse> {
    Json(AuthResponse {
        success: true,
        message: "Logged out successfully".into(),
        user: None,
    })
}

fn rejected(err: ValidationError) -> ApiError {
    debug!(reason = %err, "auth form rejected");
    ApiError::validation(err.to_string())
}
