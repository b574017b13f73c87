//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `REDTRACK_DB_PATH`: Cache database file path
//! - `REDTRACK_DB_POOL_SIZE`: Connection pool size
//! - `REDMINE_API_URL`: Base URL of the Redmine instance (optional)
//! - `REDMINE_API_KEY`: Redmine API key (optional)
//! - `REDTRACK_USE_MOCK`: Use the deterministic offline source (true/false)
//! - `REDTRACK_FETCH_DELAY_SECS`: Delay between source calls in seconds
//! - `REDTRACK_FETCH_INTERVAL_SECS`: Scheduled fetch interval in seconds
//! - `REDTRACK_FETCH_ENABLED`: Whether the fetch scheduler runs (true/false)
//!
//! ## File Locations
//! The loader probes `config.{json,toml}` and `redtrack.{json,toml}` in
//! the current working directory, up to two parent directories, and next
//! to the executable.

use std::path::{Path, PathBuf};

use redtrack_domain::{
    CalendarConfig, Config, DatabaseConfig, FetchSettings, RedTrackError, RedmineConfig, Result,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `RedTrackError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    // Pick up a .env file when present; ignore a missing one.
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The database variables are required; everything else falls back to
/// its default. See the module documentation for the complete list.
///
/// # Errors
/// Returns `RedTrackError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("REDTRACK_DB_PATH")?;
    let db_pool_size = env_var("REDTRACK_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| RedTrackError::Config(format!("Invalid pool size: {e}")))
    })?;

    let base_url = std::env::var("REDMINE_API_URL").ok().filter(|s| !s.is_empty());
    let api_key = std::env::var("REDMINE_API_KEY").ok().filter(|s| !s.is_empty());
    let use_mock = env_bool("REDTRACK_USE_MOCK", false);

    let defaults = FetchSettings::default();
    let page_delay_secs = env_u64("REDTRACK_FETCH_DELAY_SECS", defaults.page_delay_secs)?;
    let interval_secs = env_u64("REDTRACK_FETCH_INTERVAL_SECS", defaults.interval_secs)?;
    let fetch_enabled = env_bool("REDTRACK_FETCH_ENABLED", defaults.enabled);

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        redmine: RedmineConfig { base_url, api_key, use_mock },
        fetch: FetchSettings { page_delay_secs, interval_secs, enabled: fetch_enabled },
        calendar: CalendarConfig::default(),
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RedTrackError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RedTrackError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RedTrackError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RedTrackError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, with the format detected by
/// file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RedTrackError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RedTrackError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RedTrackError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, up to two parent directories
/// and the executable's directory, in that order.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("redtrack.json"),
            cwd.join("redtrack.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
            cwd.join("../../config.json"),
            cwd.join("../../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("redtrack.json"),
                exe_dir.join("redtrack.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        RedTrackError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional numeric environment variable.
fn env_u64(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map_err(|e| RedTrackError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
