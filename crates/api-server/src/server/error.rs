//! The uniform JSON error envelope every failing request ends in.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorEnvelope, ServiceError};
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// An error on its way to the client: a [`ServiceError`] plus the path it
/// was raised for.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ApiError {
    error: ServiceError,
    path: Option<String>,
}

impl ApiError {
    /// The not-found stage: nothing earlier matched `uri`.
    pub fn not_found(uri: &Uri) -> Self {
        Self::from(ServiceError::NotFound(format!("Not Found - {}", uri.path())))
            .with_path(uri.path())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into()).into()
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        ServiceError::InvalidBody(message.into()).into()
    }

    pub fn cors_rejected(origin: &str) -> Self {
        ServiceError::CorsRejected(format!("Not allowed by CORS: {origin}")).into()
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::Internal(message.into()).into()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn code(&self) -> &'static str {
        self.error.code()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), message = %self.error.message(), "request failed");
        }
        let body = ErrorEnvelope::from(&self.error);
        let body = match self.path {
            Some(path) => body.with_path(path),
            None => body,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self { error, path: None }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{err:#}"))
    }
}
