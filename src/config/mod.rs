use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "SPARROW_CONFIG";

/// Environment variable overriding `controller.base_url`.
pub const CONTROLLER_URL_ENV: &str = "SPARROW_CONTROLLER_URL";

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Controller service connection
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ControllerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Refresh cadences (seconds)
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Full agent refresh and existence sweep
    #[serde(default = "default_agent_refresh")]
    pub agent_refresh_secs: u64,
    #[serde(default = "default_scan_refresh")]
    pub scan_refresh_secs: u64,
    #[serde(default = "default_continuous_refresh")]
    pub continuous_refresh_secs: u64,
    /// Attack-scan poll of the focused agent
    #[serde(default = "default_attack_poll")]
    pub attack_poll_secs: u64,
    /// Number of scans fetched per history refresh
    #[serde(default = "default_scan_history_limit")]
    pub scan_history_limit: usize,
}

fn default_agent_refresh() -> u64 {
    30
}

fn default_scan_refresh() -> u64 {
    10
}

fn default_continuous_refresh() -> u64 {
    15
}

fn default_attack_poll() -> u64 {
    5
}

fn default_scan_history_limit() -> usize {
    20
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            agent_refresh_secs: default_agent_refresh(),
            scan_refresh_secs: default_scan_refresh(),
            continuous_refresh_secs: default_continuous_refresh(),
            attack_poll_secs: default_attack_poll(),
            scan_history_limit: default_scan_history_limit(),
        }
    }
}

impl PollingConfig {
    pub fn agent_refresh(&self) -> Duration {
        secs(self.agent_refresh_secs)
    }

    pub fn scan_refresh(&self) -> Duration {
        secs(self.scan_refresh_secs)
    }

    pub fn continuous_refresh(&self) -> Duration {
        secs(self.continuous_refresh_secs)
    }

    pub fn attack_poll(&self) -> Duration {
        secs(self.attack_poll_secs)
    }
}

// Zero would make tokio::time::interval panic
fn secs(value: u64) -> Duration {
    Duration::from_secs(value.max(1))
}

/// Entity index settings
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_attack_page_size")]
    pub attack_page_size: usize,
    /// Observation window for location estimates
    #[serde(default = "default_location_window")]
    pub location_window_hours: u64,
}

fn default_page_size() -> usize {
    25
}

fn default_attack_page_size() -> usize {
    15
}

fn default_location_window() -> u64 {
    24
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            attack_page_size: default_attack_page_size(),
            location_window_hours: default_location_window(),
        }
    }
}

impl IndexConfig {
    pub fn window_ms(&self) -> i64 {
        self.location_window_hours as i64 * 60 * 60 * 1000
    }
}

/// View API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<DashboardConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
    let config: DashboardConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path))?;
    Ok(config)
}

/// Load from `SPARROW_CONFIG` when set (defaults otherwise), then apply
/// `SPARROW_CONTROLLER_URL`.
pub fn load_from_env() -> Result<DashboardConfig> {
    let mut config = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.is_empty() => load_config(&path)?,
        _ => DashboardConfig::default(),
    };
    if let Ok(url) = std::env::var(CONTROLLER_URL_ENV) {
        apply_controller_url(&mut config, &url);
    }
    Ok(config)
}

fn apply_controller_url(config: &mut DashboardConfig, url: &str) {
    let url = url.trim();
    if !url.is_empty() {
        config.controller.base_url = url.to_string();
    }
}
