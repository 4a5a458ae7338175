//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and the fixed middleware chain.
//! - Enforce per-client rate limits for `/api` and `/api/auth`.
//! - Inject shared application state (`AppState`) into handlers.
//! - Render every failure as the uniform JSON error envelope.

pub mod error;
pub mod handlers;
pub mod limiter;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
