use crate::config::{GridFallback, KmaConfig};
use crate::error::KmaError;
use crate::forecast::base_time::{now_kst, BaseTimeResolver};
use crate::forecast::extractor::{extract_record, ForecastSlice};
use crate::forecast::fetcher::ForecastFetcher;
use crate::grid::locate_grid::GridLocator;
use crate::http::HttpFetcher;
use crate::lake::parquet_sink::{ParquetSink, WriteMode};
use crate::types::forecast_record::ForecastRecord;
use crate::types::grid::GridCoordinate;
use crate::utils::ensure_dir_exists;
use bon::bon;
use chrono::NaiveDateTime;
use log::info;

/// The main entry point: fetches KMA short-term forecasts and logs them to
/// the weather table.
///
/// Holds one HTTP client, the geocoding table cache and the table sink, so a
/// single instance should be reused across calls.
///
/// # Example
///
/// ```no_run
/// use kma_weather::{KmaConfig, KmaWeather, WriteMode};
///
/// # async fn run() -> Result<(), kma_weather::KmaError> {
/// let weather = KmaWeather::new(KmaConfig::new("my%2Fservice%2Fkey")).await?;
///
/// let record = weather
///     .fetch()
///     .address("서울특별시 종로구 청운효자동")
///     .call()
///     .await?;
/// println!("{} T3H={}", record.datehour, record.get(kma_weather::Category::T3h));
///
/// weather.log_forecast().mode(WriteMode::Append).call().await?;
/// # Ok(())
/// # }
/// ```
pub struct KmaWeather {
    config: KmaConfig,
    resolver: BaseTimeResolver,
    fetcher: ForecastFetcher,
    grid_locator: GridLocator,
    sink: ParquetSink,
}

#[bon]
impl KmaWeather {
    pub async fn new(config: KmaConfig) -> Result<Self, KmaError> {
        let resolver = BaseTimeResolver::new(config.delay_minutes)?;
        if let Some(cache_dir) = &config.cache_dir {
            ensure_dir_exists(cache_dir)
                .await
                .map_err(|e| KmaError::CacheDirCreation(cache_dir.clone(), e))?;
        }

        let http = HttpFetcher::new(config.timeout(), config.retry())?;
        let fetcher = ForecastFetcher::new(
            http.clone(),
            &config.forecast_url,
            &config.service_key,
            config.num_of_rows,
        );
        let grid_locator = GridLocator::new(http, &config.grid_url, config.cache_dir.as_deref());
        let sink = ParquetSink::new(config.weather_table_path());

        Ok(Self {
            config,
            resolver,
            fetcher,
            grid_locator,
            sink,
        })
    }

    /// Builds a client from `KMA_`-prefixed environment variables.
    pub async fn from_env() -> Result<Self, KmaError> {
        Self::new(KmaConfig::from_env()?).await
    }

    pub fn config(&self) -> &KmaConfig {
        &self.config
    }

    pub fn base_time_resolver(&self) -> BaseTimeResolver {
        self.resolver
    }

    pub fn grid_locator(&self) -> &GridLocator {
        &self.grid_locator
    }

    pub fn sink(&self) -> &ParquetSink {
        &self.sink
    }

    /// Resolves `address` to a grid cell, applying the configured
    /// [`GridFallback`] when resolution fails.
    pub async fn grid_coordinate(&self, address: &str) -> Result<GridCoordinate, KmaError> {
        match self.config.grid_fallback {
            GridFallback::Strict => Ok(self.grid_locator.resolve(address).await?),
            GridFallback::DefaultStation => Ok(self.grid_locator.resolve_or_default(address).await),
        }
    }

    /// Fetches the forecast slice four hours after the base time for one
    /// address and returns it as a single weather-table row.
    ///
    /// # Arguments
    ///
    /// * `.address(&str)`: *Optional.* Three-level administrative address.
    ///   Defaults to the configured station.
    /// * `.base_time(NaiveDateTime)`: *Optional.* Explicit base time (KST).
    ///   Defaults to the most recent published base time.
    #[builder]
    pub async fn fetch(
        &self,
        address: Option<&str>,
        base_time: Option<NaiveDateTime>,
    ) -> Result<ForecastRecord, KmaError> {
        let station = address.unwrap_or(self.config.station.as_str());
        let base = base_time.unwrap_or_else(|| self.resolver.last_base(now_kst()));

        let grid = self.grid_coordinate(station).await?;
        let items = self.fetcher.fetch(base, grid).await?;
        Ok(extract_record(&items, &ForecastSlice::after(base), station))
    }

    /// Same as [`KmaWeather::fetch`], then writes the row to the weather table.
    ///
    /// * `.mode(WriteMode)`: *Optional.* Defaults to [`WriteMode::Append`].
    #[builder]
    pub async fn log_forecast(
        &self,
        address: Option<&str>,
        base_time: Option<NaiveDateTime>,
        mode: Option<WriteMode>,
    ) -> Result<ForecastRecord, KmaError> {
        let record = self
            .fetch()
            .maybe_address(address)
            .maybe_base_time(base_time)
            .call()
            .await?;

        let rows = self
            .sink
            .write(record.to_dataframe()?, mode.unwrap_or_default())
            .await?;
        info!(
            "Logged forecast for '{}' at {} ({} rows in table)",
            record.station, record.datehour, rows
        );
        Ok(record)
    }
}
