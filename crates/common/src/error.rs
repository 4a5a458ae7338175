//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::InvalidBody`] → 400
/// - [`ServiceError::Validation`] → 400
/// - [`ServiceError::CorsRejected`] → 403
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::PayloadTooLarge`] → 413
/// - [`ServiceError::UnsupportedMediaType`] → 415
/// - [`ServiceError::NotImplemented`] → 501
/// - [`ServiceError::Internal`] → 500
///
/// Rate limiting is answered with its own payload and has no variant here.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The body could not be read or parsed as JSON / form data.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// The body parsed but a field failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The request `Origin` is not on the allow-list.
    #[error("cors origin rejected: {0}")]
    CorsRejected(String),

    /// No route or resource matched.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body exceeded the configured cap.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// The body is neither JSON nor URL-encoded.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The handler group for this route is not mounted in this build.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::InvalidBody(_) | ServiceError::Validation(_) => 400,
            ServiceError::CorsRejected(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::PayloadTooLarge(_) => 413,
            ServiceError::UnsupportedMediaType(_) => 415,
            ServiceError::NotImplemented(_) => 501,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code placed in the JSON error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidBody(_) => "INVALID_BODY",
            ServiceError::Validation(_) => "VALIDATION_FAILED",
            ServiceError::CorsRejected(_) => "CORS_ORIGIN_REJECTED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ServiceError::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            ServiceError::NotImplemented(_) => "NOT_IMPLEMENTED",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The caller-safe message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::InvalidBody(m)
            | ServiceError::Validation(m)
            | ServiceError::CorsRejected(m)
            | ServiceError::NotFound(m)
            | ServiceError::PayloadTooLarge(m)
            | ServiceError::UnsupportedMediaType(m)
            | ServiceError::NotImplemented(m)
            | ServiceError::Internal(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(ServiceError::InvalidBody("x".into()).http_status(), 400);
        assert_eq!(ServiceError::Validation("x".into()).http_status(), 400);
        assert_eq!(ServiceError::CorsRejected("x".into()).http_status(), 403);
        assert_eq!(ServiceError::NotFound("x".into()).http_status(), 404);
        assert_eq!(ServiceError::PayloadTooLarge("x".into()).http_status(), 413);
        assert_eq!(ServiceError::UnsupportedMediaType("x".into()).http_status(), 415);
        assert_eq!(ServiceError::NotImplemented("x".into()).http_status(), 501);
        assert_eq!(ServiceError::Internal("x".into()).http_status(), 500);
    }

    #[test]
    fn display_includes_message() {
        let e = ServiceError::Validation("Passwords do not match".into());
        assert!(e.to_string().contains("Passwords do not match"));
        assert_eq!(e.message(), "Passwords do not match");
    }

    #[test]
    fn codes_are_upper_snake() {
        let e = ServiceError::CorsRejected("Not allowed by CORS".into());
        assert_eq!(e.code(), "CORS_ORIGIN_REJECTED");
        assert!(e.code().chars().all(|c| c.is_ascii_uppercase() || c == '_'));
    }
}
