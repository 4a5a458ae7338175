//! Request logging: a terse `dev` line in development, Apache combined-log
//! lines everywhere else.

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use super::rate_limit::client_addr;
use crate::server::state::AppState;

/// Request log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `GET /api 200 3.112 ms - 412`
    Dev,
    /// `203.0.113.9 - - [10/Oct/2025:13:55:36 +0000] "GET /api HTTP/1.1" 200 412 "-" "curl/8.4.0"`
    Combined,
}

impl LogFormat {
    pub fn for_environment(development: bool) -> Self {
        if development {
            LogFormat::Dev
        } else {
            LogFormat::Combined
        }
    }
}

/// Fields captured for one completed request.
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub remote_addr: String,
    pub at: DateTime<Utc>,
    pub method: String,
    pub uri: String,
    pub version: String,
    pub status: u16,
    pub length: Option<u64>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub latency: Duration,
}

impl AccessRecord {
    pub fn render(&self, format: LogFormat) -> String {
        let length = self
            .length
            .map_or_else(|| "-".to_owned(), |l| l.to_string());
        match format {
            LogFormat::Dev => format!(
                "{} {} {} {:.3} ms - {}",
                self.method,
                self.uri,
                self.status,
                self.latency.as_secs_f64() * 1000.0,
                length
            ),
            LogFormat::Combined => format!(
                "{} - - [{}] \"{} {} {}\" {} {} \"{}\" \"{}\"",
                self.remote_addr,
                self.at.format("%d/%b/%Y:%H:%M:%S %z"),
                self.method,
                self.uri,
                self.version,
                self.status,
                length,
                self.referrer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
        }
    }
}

/// Emit one access line per request once the response is ready.
pub async fn log_requests(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let at = Utc::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let version = format!("{:?}", request.version());
    let remote_addr = client_addr(&request, state.config.trust_proxy).unwrap_or_else(|| "-".into());
    let referrer = header_text(request.headers(), header::REFERER);
    let user_agent = header_text(request.headers(), header::USER_AGENT);

    let response = next.run(request).await;

    let record = AccessRecord {
        remote_addr,
        at,
        method,
        uri,
        version,
        status: response.status().as_u16(),
        length: header_text(response.headers(), header::CONTENT_LENGTH)
            .and_then(|v| v.parse().ok()),
        referrer,
        user_agent,
        latency: started.elapsed(),
    };

    let format = LogFormat::for_environment(state.config.is_development());
    info!(target: "access", status = record.status, "{}", record.render(format));
    response
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Span-per-request layer; development spans include request headers.
pub fn create_trace_layer(
    development: bool,
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    let level = if development { Level::DEBUG } else { Level::INFO };
    TraceLayer::new_for_http()
        .make_span_with(
            DefaultMakeSpan::new()
                .level(level)
                .include_headers(development),
        )
        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::MongoHandle;
    use crate::server::router;
    use axum::http::StatusCode;
    use chrono::TimeZone;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tower::ServiceExt;
    use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

    fn record() -> AccessRecord {
        AccessRecord {
            remote_addr: "203.0.113.9".into(),
            at: Utc.with_ymd_and_hms(2025, 10, 10, 13, 55, 36).unwrap(),
            method: "GET".into(),
            uri: "/api?x=1".into(),
            version: "HTTP/1.1".into(),
            status: 200,
            length: Some(412),
            referrer: None,
            user_agent: Some("curl/8.4.0".into()),
            latency: Duration::from_micros(3112),
        }
    }

    #[test]
    fn combined_format_matches_apache_layout() {
        assert_eq!(
            record().render(LogFormat::Combined),
            "203.0.113.9 - - [10/Oct/2025:13:55:36 +0000] \"GET /api?x=1 HTTP/1.1\" 200 412 \"-\" \"curl/8.4.0\""
        );
    }

    #[test]
    fn dev_format_is_terse() {
        assert_eq!(record().render(LogFormat::Dev), "GET /api?x=1 200 3.112 ms - 412");
    }

    #[test]
    fn missing_length_renders_dash() {
        let mut r = record();
        r.length = None;
        assert!(r.render(LogFormat::Dev).ends_with("- -"));
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    async fn logged_at_info(state: AppState, request: Request<Body>) -> String {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new("info"))
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(move || writer.clone()),
            );
        let _guard = tracing::subscriber::set_default(subscriber);

        let response = router::build(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        capture.text()
    }

    #[tokio::test]
    async fn development_requests_are_visible_at_info() {
        let state = AppState::default();
        assert!(state.config.is_development());

        let out = logged_at_info(
            state,
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert!(out.contains("GET /health 200"), "captured: {out:?}");
    }

    #[tokio::test]
    async fn combined_line_uses_forwarded_client_address() {
        let config = Config {
            node_env: "production".into(),
            ..Config::default()
        };
        let state = AppState::new(config, Arc::new(MongoHandle::new()));

        let request = Request::get("/health")
            .header("x-forwarded-for", "10.0.0.1, 198.51.100.7")
            .header(header::USER_AGENT, "curl/8.4.0")
            .body(Body::empty())
            .unwrap();
        let out = logged_at_info(state, request).await;
        assert!(
            out.contains("198.51.100.7 - - ["),
            "captured: {out:?}"
        );
        assert!(out.contains("\"GET /health HTTP/1.1\" 200"), "captured: {out:?}");
    }

    #[test]
    fn format_follows_environment() {
        assert_eq!(LogFormat::for_environment(true), LogFormat::Dev);
        assert_eq!(LogFormat::for_environment(false), LogFormat::Combined);
    }
}
