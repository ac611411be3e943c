//! Global configuration loader for Hookflow.
//!
//! Reads `hookflow.toml` from the data directory (`~/.hookflow/` unless
//! `HOOKFLOW_DATA_DIR` is set) and deserializes it into [`GlobalConfig`].
//! Falls back to sensible defaults when the file is missing or malformed.
//! Selected environment variables override file values.

use std::path::{Path, PathBuf};

use hookflow_types::config::GlobalConfig;

/// Config file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "hookflow.toml";

/// Resolve the data directory: `HOOKFLOW_DATA_DIR`, else `~/.hookflow`,
/// else `./.hookflow` when no home directory is known.
pub fn resolve_data_dir() -> PathBuf {
    match std::env::var_os("HOOKFLOW_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hookflow"),
    }
}

/// Load global configuration from `{data_dir}/hookflow.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join(CONFIG_FILE_NAME);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No {CONFIG_FILE_NAME} found at {}, using defaults",
                config_path.display()
            );
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Apply `PORT`, `HOOKFLOW_DATABASE_URL` and `HOOKFLOW_WEB_DIR` overrides.
pub fn apply_env_overrides(config: &mut GlobalConfig) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut GlobalConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(port) = lookup("PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("Ignoring invalid PORT value '{port}'"),
        }
    }
    if let Some(url) = lookup("HOOKFLOW_DATABASE_URL").filter(|v| !v.is_empty()) {
        config.database_url = Some(url);
    }
    if let Some(dir) = lookup("HOOKFLOW_WEB_DIR").filter(|v| !v.is_empty()) {
        config.web_dir = Some(dir);
    }
}
