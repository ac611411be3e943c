//! Global configuration types for Hookflow.
//!
//! `GlobalConfig` represents the top-level `hookflow.toml` that controls the
//! API server address, storage location, outbound HTTP client, and logging.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Hookflow service.
///
/// Loaded from `~/.hookflow/hookflow.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite URL. Defaults to `hookflow.db` inside the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Directory of a pre-built web UI to serve as SPA fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_dir: Option<String>,

    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Address the API server binds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Settings for the shared outbound HTTP client used by `http_request` steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("hookflow/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Bridge tracing spans to an OpenTelemetry stdout exporter.
    #[serde(default)]
    pub otel: bool,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
