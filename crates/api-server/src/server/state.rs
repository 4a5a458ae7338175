//! Shared application state injected into every Axum handler and middleware.

use std::sync::Arc;

use crate::config::Config;
use crate::db::{MongoHandle, Persistence};

use super::limiter::{LimitPolicy, RateLimiter};
use super::middleware::security::SecurityHeaders;

/// The two limiters of the middleware chain.
#[derive(Clone, Debug)]
pub struct Limits {
    /// Applied to every `/api` request.
    pub general: RateLimiter,
    /// Applied on top of `general` to `/api/auth`.
    pub auth: RateLimiter,
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            general: RateLimiter::new(LimitPolicy::general(
                config.rate_limit_max,
                config.rate_limit_window(),
            )),
            auth: RateLimiter::new(LimitPolicy::auth()),
        }
    }
}

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Persistence handle, read by `/health` and closed on shutdown.
    pub db: Arc<dyn Persistence>,
    pub limits: Limits,
    pub security: Arc<SecurityHeaders>,
    /// CORS allow-list, precomputed from the config.
    pub origins: Arc<[String]>,
}

impl AppState {
    /// Create a new [`AppState`] from validated config and a persistence handle.
    pub fn new(config: Config, db: Arc<dyn Persistence>) -> Self {
        Self {
            limits: Limits::from_config(&config),
            security: Arc::new(SecurityHeaders::from_config(&config)),
            origins: config.allowed_origins().into(),
            config: Arc::new(config),
            db,
        }
    }
}

impl Default for AppState {
    /// Creates a default [`AppState`] with a disconnected database, suitable for tests.
    fn default() -> Self {
        Self::new(Config::default(), Arc::new(MongoHandle::new()))
    }
}
