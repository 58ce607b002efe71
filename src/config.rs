//! Runtime configuration, read from `KMA_`-prefixed environment variables.

use crate::retry::RetryConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FORECAST_URL: &str =
    "http://newsky2.kma.go.kr/service/SecndSrtpdFrcstInfoService2/ForecastSpaceData";
pub const DEFAULT_GRID_URL: &str = "http://www.kma.go.kr/DFSROOT/POINT/DATA";
pub const DEFAULT_STATION: &str = "충청남도 천안시서북구 부성동";

/// Logical location of the weather table inside the lake root.
pub const WEATHER_TABLE: &str = "weather/kma/weather.parquet";

/// What to do when an address cannot be resolved to a grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridFallback {
    /// Surface the resolution error to the caller.
    #[default]
    Strict,
    /// Log a warning and use the default station's coordinate (63, 111).
    DefaultStation,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KmaConfig {
    /// Service key as issued by data.go.kr. Keys are issued URL-encoded and
    /// are sent verbatim.
    pub service_key: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_grid_url")]
    pub grid_url: String,
    /// Address used when a request does not name one.
    #[serde(default = "default_station")]
    pub station: String,
    #[serde(default = "default_lake_root")]
    pub lake_root: PathBuf,
    /// Directory for the on-disk geocoding table cache. Disabled when unset.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_delay_minutes")]
    pub delay_minutes: u32,
    #[serde(default = "default_num_of_rows")]
    pub num_of_rows: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default)]
    pub grid_fallback: GridFallback,
}

fn default_forecast_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}

fn default_grid_url() -> String {
    DEFAULT_GRID_URL.to_string()
}

fn default_station() -> String {
    DEFAULT_STATION.to_string()
}

fn default_lake_root() -> PathBuf {
    PathBuf::from("./lake")
}

fn default_delay_minutes() -> u32 {
    30
}

fn default_num_of_rows() -> u32 {
    20
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

impl KmaConfig {
    /// Configuration with every optional setting at its default.
    pub fn new(service_key: impl Into<String>) -> Self {
        Self {
            service_key: service_key.into(),
            forecast_url: default_forecast_url(),
            grid_url: default_grid_url(),
            station: default_station(),
            lake_root: default_lake_root(),
            cache_dir: None,
            delay_minutes: default_delay_minutes(),
            num_of_rows: default_num_of_rows(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            grid_fallback: GridFallback::default(),
        }
    }

    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("KMA_").from_env()
    }

    /// Same as [`KmaConfig::from_env`] but over an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed("KMA_").from_iter(vars)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            base_delay_ms: self.retry_base_delay_ms,
            ..RetryConfig::default()
        }
    }

    pub fn weather_table_path(&self) -> PathBuf {
        self.lake_root.join(WEATHER_TABLE)
    }
}
