use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::constants::{
    GEOCODING_API_BASE, OPEN_METEO_API_BASE, RAINVIEWER_API_BASE, REQUEST_TIMEOUT_SECS,
    SEARCH_DEBOUNCE_MS,
};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "MCP_CITY_WEATHER_CONFIG";

const APP_DIR: &str = "mcp-city-weather";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding persisted client state (saved cities)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote service endpoints
    #[serde(default)]
    pub api: ApiConfig,

    /// City search behaviour
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Open-Meteo forecast API base URL
    pub forecast_base: String,

    /// Open-Meteo geocoding API base URL
    pub geocoding_base: String,

    /// RainViewer API base URL
    pub rainviewer_base: String,

    /// OpenWeatherMap tile credential for non-precipitation radar layers
    pub openweathermap_app_id: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_base: OPEN_METEO_API_BASE.to_string(),
            geocoding_base: GEOCODING_API_BASE.to_string(),
            rainviewer_base: RAINVIEWER_API_BASE.to_string(),
            openweathermap_app_id: "demo".to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a search request is sent
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: SEARCH_DEBOUNCE_MS,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api: ApiConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Config {
    /// Config file path: `$MCP_CITY_WEATHER_CONFIG`, else the platform config dir
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load configuration from file, using defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the client cannot run with
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("api.forecast_base", &self.api.forecast_base),
            ("api.geocoding_base", &self.api.geocoding_base),
            ("api.rainviewer_base", &self.api.rainviewer_base),
        ] {
            let url = Url::parse(value).with_context(|| format!("{field}: invalid URL {value:?}"))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                anyhow::bail!("{field}: URL must use http or https");
            }
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("api.request_timeout_secs must be greater than 0");
        }

        if self.search.debounce_ms > 5_000 {
            tracing::warn!(
                "search.debounce_ms is {}ms; searches will feel unresponsive",
                self.search.debounce_ms
            );
        }

        Ok(())
    }
}
