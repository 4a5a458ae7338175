//! Route groups mounted under `/api`.

pub mod auth;
pub mod resources;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use super::handlers;
use super::middleware::rate_limit::limit_auth;
use super::state::AppState;
use resources::ResourceGroup;

/// Everything under `/api`: the directory, the auth group behind its own
/// limiter, and the resource groups.
pub fn api_router(state: &AppState) -> Router<AppState> {
    let auth = auth::router().layer(from_fn_with_state(state.clone(), limit_auth));

    ResourceGroup::ALL.into_iter().fold(
        Router::new()
            .route("/", get(handlers::api_index).fallback(handlers::not_found))
            .nest("/auth", auth),
        |api, group| api.nest(group.mount(), group.router()),
    )
}
