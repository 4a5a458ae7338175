//! `api-server` — OmniRewards API entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables (and `.env`).
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP).
//! 3. Connect persistence, build the Axum router, and serve until a signal
//!    or a fault; then drain and exit with the lifecycle's status.

mod config;
mod db;
mod lifecycle;
mod server;
mod telemetry;

use std::process::ExitCode;

use tracing::{error, info};

use config::Config;
use lifecycle::ExitStatus;

#[tokio::main]
async fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitStatus::Failure.into();
        }
    };

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init_telemetry(&cfg) {
        eprintln!("ERROR: telemetry initialisation failed: {e:#}");
        return ExitStatus::Failure.into();
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        environment = %cfg.node_env,
        "api-server starting"
    );

    // -----------------------------------------------------------------------
    // 3. Serve, drain, exit
    // -----------------------------------------------------------------------
    let status = match lifecycle::run(cfg).await {
        Ok(status) => status,
        Err(e) => {
            error!(error = %format!("{e:#}"), "server failed to start");
            ExitStatus::Failure
        }
    };

    telemetry::shutdown_telemetry();
    status.into()
}
