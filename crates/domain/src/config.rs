//! Configuration structures consumed by the infrastructure loader.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::default_holidays;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redmine: RedmineConfig,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Local cache database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Connection pool size.
    pub pool_size: u32,
}

/// External source settings.
///
/// When `base_url` or `api_key` is missing the HTTP client degrades to
/// an unconfigured no-op state; `use_mock` selects the deterministic
/// offline source instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedmineConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub use_mock: bool,
}

/// Scheduled bulk-fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Delay between consecutive source calls, in seconds. Used by
    /// scheduled bulk fetches to respect rate limits.
    #[serde(default = "default_page_delay_secs")]
    pub page_delay_secs: u64,
    /// Interval between scheduled fetch runs, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Whether the background fetch scheduler runs at all.
    #[serde(default)]
    pub enabled: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            page_delay_secs: default_page_delay_secs(),
            interval_secs: default_interval_secs(),
            enabled: false,
        }
    }
}

/// Business-day calendar settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Dates that never count as working days.
    #[serde(default = "default_holidays")]
    pub holidays: Vec<NaiveDate>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { holidays: default_holidays() }
    }
}

fn default_page_delay_secs() -> u64 {
    2
}

fn default_interval_secs() -> u64 {
    3600
}
