use crate::forecast::base_time::FORECAST_LEAD_HOURS;
use crate::forecast::response::ForecastItem;
use crate::types::category::Category;
use crate::types::forecast_record::ForecastRecord;
use chrono::{Duration, NaiveDateTime};
use log::debug;

/// The single (base time, forecast time) pair a fetch keeps from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastSlice {
    pub base: NaiveDateTime,
    pub forecast: NaiveDateTime,
}

impl ForecastSlice {
    /// The slice [`FORECAST_LEAD_HOURS`] after `base`.
    pub fn after(base: NaiveDateTime) -> Self {
        Self {
            base,
            forecast: base + Duration::hours(FORECAST_LEAD_HOURS),
        }
    }

    // Responses echo base and forecast times at hour granularity ("1400"),
    // even though requests carry the publication minute ("1430").
    fn base_date(&self) -> String {
        self.base.format("%Y%m%d").to_string()
    }

    fn base_hour(&self) -> String {
        self.base.format("%H00").to_string()
    }

    fn forecast_date(&self) -> String {
        self.forecast.format("%Y%m%d").to_string()
    }

    fn forecast_hour(&self) -> String {
        self.forecast.format("%H00").to_string()
    }

    /// Value of the `datehour` column: the forecast time as `YYYY-MM-DD HH`.
    pub fn datehour(&self) -> String {
        self.forecast.format("%Y-%m-%d %H").to_string()
    }
}

/// Numeric times lose their leading zero on the wire (`200` for `0200`).
fn pad_hhmm(time: &str) -> String {
    format!("{:0>4}", time.trim())
}

/// Builds the single weather-table row for `slice` out of `items`.
///
/// An item contributes iff its base date, base time, forecast date and
/// forecast time all equal the slice and its category is tracked. Every other
/// item is dropped silently, and a response without any matching item still
/// yields a row (with empty measurements).
pub fn extract_record(items: &[ForecastItem], slice: &ForecastSlice, station: &str) -> ForecastRecord {
    let base_date = slice.base_date();
    let base_hour = slice.base_hour();
    let forecast_date = slice.forecast_date();
    let forecast_hour = slice.forecast_hour();

    let mut record = ForecastRecord::new(station, slice.datehour());
    let mut matched = 0usize;

    for item in items {
        if item.base_date != base_date
            || pad_hhmm(&item.base_time) != base_hour
            || item.fcst_date != forecast_date
            || pad_hhmm(&item.fcst_time) != forecast_hour
        {
            continue;
        }
        if let Ok(category) = item.category.parse::<Category>() {
            record.set(category, item.fcst_value.clone());
            matched += 1;
        }
    }

    debug!(
        "Kept {} of {} forecast items for base {} {} -> {} {}",
        matched,
        items.len(),
        base_date,
        base_hour,
        forecast_date,
        forecast_hour
    );
    record
}
