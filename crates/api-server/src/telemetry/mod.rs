//! Logging and tracing setup.
//!
//! Development runs log human-readable text; every other environment logs
//! JSON lines. When `OTEL_EXPORTER_OTLP_ENDPOINT` is set, spans are also
//! exported over OTLP/gRPC.
//!
//! # Telemetry invariants
//!
//! - **No credentials or raw request bodies** may appear in any span
//!   attribute or log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden
//!   by `RUST_LOG`.

pub mod init;

pub use init::{init_telemetry, panic_message, shutdown_telemetry};
