//! Resource groups advertised by `/api` whose handlers are not mounted yet.
//!
//! Each group owns its whole prefix and answers any method or sub-path with
//! `501 NOT_IMPLEMENTED` naming the group, so clients can tell "not built"
//! apart from "no such path".

use axum::{
    extract::OriginalUri,
    routing::any,
    Router,
};
use common::ServiceError;

use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceGroup {
    Users,
    Transactions,
    Rewards,
    Loyalty,
    Analytics,
}

impl ResourceGroup {
    pub const ALL: [ResourceGroup; 5] = [
        ResourceGroup::Users,
        ResourceGroup::Transactions,
        ResourceGroup::Rewards,
        ResourceGroup::Loyalty,
        ResourceGroup::Analytics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceGroup::Users => "users",
            ResourceGroup::Transactions => "transactions",
            ResourceGroup::Rewards => "rewards",
            ResourceGroup::Loyalty => "loyalty",
            ResourceGroup::Analytics => "analytics",
        }
    }

    /// Mount point relative to `/api`.
    pub fn mount(self) -> &'static str {
        match self {
            ResourceGroup::Users => "/users",
            ResourceGroup::Transactions => "/transactions",
            ResourceGroup::Rewards => "/rewards",
            ResourceGroup::Loyalty => "/loyalty",
            ResourceGroup::Analytics => "/analytics",
        }
    }

    pub fn router(self) -> Router<AppState> {
        let handler = move |OriginalUri(uri): OriginalUri| async move {
            ApiError::from(ServiceError::NotImplemented(format!(
                "{} endpoints are not implemented yet",
                self.name()
            )))
            .with_path(uri.path())
        };
        Router::new()
            .route("/", any(handler))
            .route("/*rest", any(handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut api = Router::new();
        for group in ResourceGroup::ALL {
            api = api.nest(group.mount(), group.router());
        }
        Router::new()
            .nest("/api", api)
            .with_state(AppState::default())
    }

    async fn call(method: &str, uri: &str) -> (StatusCode, Value) {
        let req = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 4096).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn every_group_answers_not_implemented() {
        for group in ResourceGroup::ALL {
            let uri = format!("/api{}", group.mount());
            let (status, body) = call("GET", &uri).await;
            assert_eq!(status, StatusCode::NOT_IMPLEMENTED, "{uri}");
            assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
            assert!(body["error"]["message"]
                .as_str()
                .unwrap()
                .starts_with(group.name()));
        }
    }

    #[tokio::test]
    async fn sub_paths_and_methods_are_covered() {
        let (status, body) = call("DELETE", "/api/rewards/42/redeem").await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["path"], "/api/rewards/42/redeem");
    }

    #[test]
    fn mounts_match_advertised_prefixes() {
        for group in ResourceGroup::ALL {
            let advertised = common::protocol::RESOURCE_PREFIXES
                .iter()
                .find(|(name, _)| *name == group.name())
                .map(|(_, prefix)| *prefix)
                .unwrap();
            assert_eq!(advertised, format!("/api{}", group.mount()));
        }
    }
}
