use std::net::SocketAddr;
use std::path::Path;

use chrono::NaiveDate;
use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".into()
}

fn default_symbols_path() -> String {
    "stock.csv".into()
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".into()
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
}

fn default_requests_per_second() -> u32 {
    5
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub symbols: SymbolsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SymbolsConfig {
    /// CSV file with at least `Name` and `Symbol` columns.
    #[serde(default = "default_symbols_path")]
    pub path: String,
}

impl Default for SymbolsConfig {
    fn default() -> Self {
        Self {
            path: default_symbols_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// First date of every fetched window; the end is always "today".
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_date: default_start_date(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_listen_addr(config)?;
    validate_symbols_path(config)?;
    validate_provider(config)?;
    Ok(())
}

fn validate_listen_addr(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.server.listen_addr.parse::<SocketAddr>().is_err() {
        return Err(Report::new(ConfigError::Validation {
            field: format!(
                "server.listen_addr \"{}\" is not a valid socket address",
                config.server.listen_addr
            ),
        }));
    }
    Ok(())
}

fn validate_symbols_path(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.symbols.path.trim().is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "symbols.path must not be blank".into(),
        }));
    }
    Ok(())
}

fn validate_provider(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    if config.provider.base_url.trim().is_empty() {
        return Err(Report::new(ConfigError::Validation {
            field: "provider.base_url must not be blank".into(),
        }));
    }
    if config.provider.requests_per_second == 0 {
        return Err(Report::new(ConfigError::Validation {
            field: "provider.requests_per_second must be > 0".into(),
        }));
    }
    Ok(())
}
