use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Workspace configuration loaded from environment variables.
/// `API_BASE_URL` is required; everything else has a sensible default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the compile backend, e.g. `http://localhost:8000`.
    pub api_base_url: String,
    /// Directory holding client-local data (pipeline presets).
    pub data_dir: PathBuf,
    /// Timeout for compile/profile requests, in seconds.
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: require_env("API_BASE_URL")?,
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Initializes structured logging for the embedding host.
/// `RUST_LOG` takes precedence over the configured default level.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// Tracing targets use the crate name as the module path root, so the
// directive must use the underscored form, not the package name.
fn default_filter_directive(level: &str) -> String {
    format!("{}={level}", env!("CARGO_CRATE_NAME"))
}
