//! Body buffering with a 10 MB cap, raw-body capture, and the [`Payload`]
//! extractor that accepts JSON or URL-encoded forms.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequest, Request},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    Form, Json,
};
use bytes::Bytes;
use common::ServiceError;
use http_body_util::LengthLimitError;
use serde::de::DeserializeOwned;
use std::error::Error as StdError;

use crate::server::error::ApiError;

/// Largest request body accepted, in bytes.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// The request body exactly as received, stored as a request extension.
#[derive(Clone, Debug, Default)]
pub struct RawBody(pub Bytes);

/// Buffer the body, keep a copy as [`RawBody`], and hand the request on.
pub async fn capture_raw_body(request: Request, next: Next) -> Response {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > BODY_LIMIT) {
        return too_large(request.uri().path());
    }

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) if exceeded_limit(&err) => return too_large(parts.uri.path()),
        Err(err) => {
            return ApiError::invalid_body(err.to_string())
                .with_path(parts.uri.path())
                .into_response()
        }
    };

    let mut request = Request::from_parts(parts, Body::from(bytes.clone()));
    request.extensions_mut().insert(RawBody(bytes));
    next.run(request).await
}

/// Whether a body read failed because it ran past [`BODY_LIMIT`].
fn exceeded_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

fn too_large(path: &str) -> Response {
    ApiError::from(ServiceError::PayloadTooLarge(
        "request body exceeds the 10mb limit".into(),
    ))
    .with_path(path)
    .into_response()
}

/// A body parsed from JSON or a URL-encoded form, with the raw bytes kept alongside.
#[derive(Debug, Clone)]
pub struct Payload<T> {
    pub data: T,
    pub raw: Bytes,
}

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let path = req.uri().path().to_owned();
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let raw = req
            .extensions()
            .get::<RawBody>()
            .map(|r| r.0.clone())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(data) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| invalid_body(rejection.body_text(), &path))?;
            Ok(Self { data, raw })
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(data) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| invalid_body(rejection.body_text(), &path))?;
            Ok(Self { data, raw })
        } else {
            Err(ApiError::from(ServiceError::UnsupportedMediaType(
                "expected application/json or application/x-www-form-urlencoded".into(),
            ))
            .with_path(path))
        }
    }
}

fn invalid_body(detail: String, path: &str) -> ApiError {
    ApiError::invalid_body(detail).with_path(path)
}
