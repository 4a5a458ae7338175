//! Security response headers with a fixed content-security policy.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::config::Config;
use crate::server::state::AppState;

/// CSP directives the frontend depends on (fonts and inline styles).
const APP_DIRECTIVES: [&str; 5] = [
    "default-src 'self'",
    "style-src 'self' 'unsafe-inline' fonts.googleapis.com",
    "font-src 'self' fonts.gstatic.com",
    "img-src 'self' data: https:",
    "script-src 'self'",
];

/// Baseline directives merged in after the application ones.
const BASELINE_DIRECTIVES: [&str; 5] = [
    "base-uri 'self'",
    "form-action 'self'",
    "frame-ancestors 'self'",
    "object-src 'none'",
    "script-src-attr 'none'",
];

const STATIC_HEADERS: [(&str, &str); 10] = [
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

const HSTS: &str = "max-age=15552000; includeSubDomains";

/// Precomputed header set applied to every response.
#[derive(Clone, Debug)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn from_config(config: &Config) -> Self {
        let production = !config.is_development();

        let mut directives: Vec<&str> = APP_DIRECTIVES
            .iter()
            .chain(BASELINE_DIRECTIVES.iter())
            .copied()
            .collect();
        if production {
            directives.push("upgrade-insecure-requests");
        }

        let mut headers = vec![(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_str(&directives.join("; "))
                .unwrap_or_else(|_| HeaderValue::from_static("default-src 'self'")),
        )];
        headers.extend(STATIC_HEADERS.iter().map(|&(name, value)| {
            (
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        }));
        if production {
            headers.push((
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(HSTS),
            ));
        }

        Self { headers }
    }

    pub fn content_security_policy(&self) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(name, _)| name == header::CONTENT_SECURITY_POLICY)
            .map(|(_, value)| value)
    }
}

/// Attach the security headers, keeping any value an inner handler already set.
pub async fn apply_security_headers(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in &state.security.headers {
        headers
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }
    response
}
