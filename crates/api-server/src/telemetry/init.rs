//! Tracing subscriber setup, optional OTLP span export, and the panic hook.

use std::any::Any;

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, Resource};
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Initialise the global tracing subscriber.
///
/// Configures:
/// - Human-readable text output in development, JSON everywhere else.
/// - A [`tracing_opentelemetry`] layer exporting spans when an OTLP endpoint
///   is configured.
/// - A panic hook that logs panics with their backtrace.
///
/// `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Returns an error if the OTLP pipeline cannot be installed or a global
/// subscriber is already set.
pub fn init_telemetry(cfg: &Config) -> Result<()> {
    let otel_layer = match cfg.otel_exporter_otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(
                    opentelemetry_sdk::trace::Config::default().with_resource(service_resource()),
                )
                .install_batch(runtime::Tokio)
                .context("failed to install OTLP tracing pipeline")?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    let (text_layer, json_layer) = if cfg.is_development() {
        (Some(fmt::layer().with_target(false)), None)
    } else {
        (None, Some(fmt::layer().json()))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(text_layer)
        .with(json_layer)
        .with(otel_layer)
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    install_panic_hook();
    Ok(())
}

/// Flush pending spans before the process exits. A no-op when no OTLP
/// pipeline was installed.
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

fn service_resource() -> Resource {
    Resource::new(vec![
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            "omnirewards-api",
        ),
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ),
    ])
}

/// Route panic reports through `tracing` so they reach the structured log.
///
/// Request-scoped panics are additionally caught and answered by the
/// router; this hook only guarantees the trace is recorded.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".into());
        error!(
            message = %panic_message(info.payload()),
            %location,
            %backtrace,
            "panic"
        );
    }));
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_str_and_string() {
        let a: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(a.as_ref()), "boom");

        let b: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(b.as_ref()), "kaboom");

        let c: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(c.as_ref()), "non-string panic payload");
    }
}
