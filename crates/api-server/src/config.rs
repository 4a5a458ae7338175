//! Configuration loading and validation for the API server.
//!
//! All values are read from environment variables at startup (after an
//! optional `.env` file). The process will exit with a clear error message if
//! any variable is present but invalid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Origins always allowed to make credentialed cross-origin calls.
const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Validated API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deployment environment name. `"development"` enables verbose request
    /// logging and a relaxed content-security policy.
    #[serde(default = "default_node_env")]
    pub node_env: String,

    /// Additional origin allowed by the CORS policy.
    #[serde(default)]
    pub frontend_url: Option<String>,

    /// General `/api` rate-limit window, in minutes.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window: u64,

    /// Requests allowed per client address per window.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    /// Connection string for the persistence collaborator.
    #[serde(default)]
    pub mongodb_uri: Option<String>,

    /// Directory served as static frontend assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Document served for every non-API browser navigation.
    #[serde(default = "default_spa_index")]
    pub spa_index: String,

    /// Take the client address from the right-most `X-Forwarded-For` hop.
    #[serde(default = "default_trust_proxy")]
    pub trust_proxy: bool,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP collector endpoint. Span export is disabled when absent.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_node_env() -> String {
    "development".into()
}
fn default_rate_limit_window() -> u64 {
    15
}
fn default_rate_limit_max() -> u32 {
    100
}
fn default_static_dir() -> String {
    "public".into()
}
fn default_spa_index() -> String {
    "index.html".into()
}
fn default_trust_proxy() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            node_env: default_node_env(),
            frontend_url: None,
            rate_limit_window: default_rate_limit_window(),
            rate_limit_max: default_rate_limit_max(),
            mongodb_uri: None,
            static_dir: default_static_dir(),
            spa_index: default_spa_index(),
            trust_proxy: default_trust_proxy(),
            log_level: default_log_level(),
            otel_exporter_otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is the normal production case.
        let _ = dotenvy::dotenv();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be > 0");
        }
        if self.rate_limit_window == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW must be > 0");
        }
        if self.rate_limit_max == 0 {
            anyhow::bail!("RATE_LIMIT_MAX must be > 0");
        }
        ensure_non_empty(&self.static_dir, "STATIC_DIR")?;
        ensure_non_empty(&self.spa_index, "SPA_INDEX")?;
        if let Some(url) = &self.frontend_url {
            ensure_non_empty(url, "FRONTEND_URL")?;
        }
        if let Some(uri) = &self.mongodb_uri {
            if !uri.starts_with("mongodb://") && !uri.starts_with("mongodb+srv://") {
                anyhow::bail!("MONGODB_URI must use the mongodb:// or mongodb+srv:// scheme");
            }
        }
        Ok(())
    }

    /// `true` when running with `NODE_ENV=development`.
    pub fn is_development(&self) -> bool {
        self.node_env.eq_ignore_ascii_case("development")
    }

    /// Origins accepted by the CORS guard.
    pub fn allowed_origins(&self) -> Vec<String> {
        DEFAULT_ORIGINS
            .iter()
            .map(|o| (*o).to_owned())
            .chain(self.frontend_url.iter().map(|u| u.trim().to_owned()))
            .collect()
    }

    /// The SPA shell document, resolved inside `static_dir`.
    pub fn spa_index_path(&self) -> PathBuf {
        Path::new(&self.static_dir).join(&self.spa_index)
    }

    /// General rate-limit window as a [`Duration`].
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window * 60)
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(())
}
