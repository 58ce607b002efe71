use crate::forecast::error::ForecastError;
use crate::forecast::response::{parse_forecast_items, ForecastItem};
use crate::http::HttpFetcher;
use crate::types::grid::GridCoordinate;
use chrono::NaiveDateTime;
use log::info;

/// Client for the `ForecastSpaceData` endpoint.
#[derive(Debug, Clone)]
pub struct ForecastFetcher {
    http: HttpFetcher,
    base_url: String,
    service_key: String,
    num_of_rows: u32,
}

impl ForecastFetcher {
    pub(crate) fn new(http: HttpFetcher, base_url: &str, service_key: &str, num_of_rows: u32) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            service_key: service_key.to_string(),
            num_of_rows,
        }
    }

    /// Request URL for a base time and grid cell.
    ///
    /// The query string is assembled by hand: service keys are issued already
    /// percent-encoded and must not be encoded a second time.
    pub fn query_url(&self, base: NaiveDateTime, grid: GridCoordinate) -> String {
        format!(
            "{}?serviceKey={}&base_date={}&base_time={}&nx={}&ny={}&numOfRows={}&_type=json",
            self.base_url,
            self.service_key,
            base.format("%Y%m%d"),
            base.format("%H%M"),
            grid.x,
            grid.y,
            self.num_of_rows
        )
    }

    pub async fn fetch(
        &self,
        base: NaiveDateTime,
        grid: GridCoordinate,
    ) -> Result<Vec<ForecastItem>, ForecastError> {
        info!(
            "Requesting forecast for base {} at grid {}",
            base.format("%Y%m%d %H%M"),
            grid
        );
        let body = self.http.get_bytes(&self.query_url(base, grid)).await?;
        let items = parse_forecast_items(&body)?;
        info!("Received {} forecast items", items.len());
        Ok(items)
    }
}
