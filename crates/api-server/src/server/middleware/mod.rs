//! Axum middleware applied to the router.
//!
//! The chain order (outermost first) is fixed: request id, security headers,
//! general rate limiter, CORS origin guard, CORS headers, request logging,
//! panic catcher, timeout, compression, body capture. The auth limiter is a
//! route layer on the auth group only.

pub mod body;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

use std::time::Duration;

pub use body::{Payload, RawBody, BODY_LIMIT};

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
