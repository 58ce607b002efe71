use crate::types::category::Category;
use polars::prelude::*;

/// Column order of the weather table.
pub const FORECAST_COLUMNS: [&str; 11] = [
    "station", "datehour", "POP", "PTY", "REH", "SKY", "T3H", "UUU", "VEC", "VVV", "WSD",
];

/// One row of the weather table: a single forecast slice for one station.
///
/// Every measurement is kept as the string the API sent. Categories that
/// were absent from the response are empty strings, never null, so the
/// Parquet schema stays all-`String` across appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRecord {
    /// The administrative address the forecast was requested for.
    pub station: String,
    /// Forecast time as `YYYY-MM-DD HH`.
    pub datehour: String,
    values: [String; 9],
}

impl ForecastRecord {
    pub fn new(station: impl Into<String>, datehour: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            datehour: datehour.into(),
            values: Default::default(),
        }
    }

    pub fn get(&self, category: Category) -> &str {
        &self.values[category.index()]
    }

    pub fn set(&mut self, category: Category, value: impl Into<String>) {
        self.values[category.index()] = value.into();
    }

    /// True when no measurement column was filled.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Builds a one-row frame with [`FORECAST_COLUMNS`] as schema.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns = Vec::with_capacity(FORECAST_COLUMNS.len());
        columns.push(Column::new("station".into(), [self.station.as_str()]));
        columns.push(Column::new("datehour".into(), [self.datehour.as_str()]));
        for category in Category::ALL {
            columns.push(Column::new(category.code().into(), [self.get(category)]));
        }
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_empty() {
        let record = ForecastRecord::new("충청남도 천안시서북구 부성동", "2019-05-01 18");
        assert!(record.is_empty());
        for category in Category::ALL {
            assert_eq!(record.get(category), "");
        }
    }

    #[test]
    fn test_to_dataframe_schema() -> Result<(), PolarsError> {
        let mut record = ForecastRecord::new("station", "2019-05-01 18");
        record.set(Category::T3h, "21");
        record.set(Category::Pop, "30");

        let df = record.to_dataframe()?;
        assert_eq!(df.shape(), (1, 11));

        let names: Vec<&str> = df.get_column_names().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, FORECAST_COLUMNS);

        assert_eq!(df.column("T3H")?.str()?.get(0), Some("21"));
        assert_eq!(df.column("POP")?.str()?.get(0), Some("30"));
        assert_eq!(df.column("WSD")?.str()?.get(0), Some(""));
        assert_eq!(df.column("datehour")?.str()?.get(0), Some("2019-05-01 18"));
        Ok(())
    }
}
