//! Request and response types exchanged between components.
//!
//! These types are serialised as JSON over the public REST API and consumed by
//! the single-page client.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "OmniRewards API";

/// Resource prefixes served under `/api`, in directory order.
pub const RESOURCE_PREFIXES: [(&str, &str); 6] = [
    ("auth", "/api/auth"),
    ("users", "/api/users"),
    ("transactions", "/api/transactions"),
    ("rewards", "/api/rewards"),
    ("loyalty", "/api/loyalty"),
    ("analytics", "/api/analytics"),
];

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

/// Machine-readable part of the error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable UPPER_SNAKE code (e.g. `"NOT_FOUND"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

/// Uniform body returned for every error funnelled through the terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always `false`.
    pub success: bool,
    pub error: ErrorBody,
    /// Request path the error was raised for, when known.
    pub path: Option<String>,
}

impl ErrorEnvelope {
    /// Construct an envelope from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            path: None,
        }
    }

    /// Attach the request path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl From<&ServiceError> for ErrorEnvelope {
    fn from(err: &ServiceError) -> Self {
        Self::new(err.code(), err.message())
    }
}

/// Fixed payload returned when a rate limiter rejects a request.
///
/// Deliberately not an [`ErrorEnvelope`]: clients key off `code` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBody {
    pub error: String,
    pub code: String,
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Database state as reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseStatus {
    Connected,
    Disconnected,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"` while the process answers.
    pub status: String,
    /// RFC 3339 UTC timestamp of the probe.
    pub timestamp: String,
    pub service: String,
    pub version: String,
    /// Value of `NODE_ENV`.
    pub environment: String,
    pub database: DatabaseStatus,
}

// ---------------------------------------------------------------------------
// API directory
// ---------------------------------------------------------------------------

/// Response body for `GET /api`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiIndex {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Resource name → path prefix, in directory order.
    pub endpoints: serde_json::Map<String, serde_json::Value>,
    pub documentation: String,
    pub health: String,
}

impl ApiIndex {
    /// The directory advertised by this build.
    pub fn current(version: &str) -> Self {
        let endpoints = RESOURCE_PREFIXES
            .iter()
            .map(|(name, prefix)| ((*name).to_owned(), serde_json::Value::from(*prefix)))
            .collect();
        Self {
            name: "OmniRewards Loyalty System API".into(),
            version: version.into(),
            description: "Comprehensive omnichannel loyalty rewards system".into(),
            endpoints,
            documentation: "/api/docs".into(),
            health: "/health".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth responses
// ---------------------------------------------------------------------------

/// The authenticated identity handed back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub display_name: String,
}

/// Successful response body for `POST /api/auth/{login,signup,logout}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: Option<AuthUser>,
}
