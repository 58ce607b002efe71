mod config;
mod error;
mod forecast;
mod grid;
mod http;
mod kma;
mod lake;
mod logger;
mod retry;
mod transform;
mod types;
mod utils;

pub use config::{GridFallback, KmaConfig, DEFAULT_STATION, WEATHER_TABLE};
pub use error::KmaError;
pub use kma::KmaWeather;
pub use logger::{ForecastLogger, LoggerStats};
pub use retry::RetryConfig;
pub use utils::default_cache_dir;

pub use forecast::base_time::{now_kst, parse_base_time, BaseTimeResolver, FORECAST_LEAD_HOURS};
pub use forecast::extractor::{extract_record, ForecastSlice};
pub use forecast::response::{parse_forecast_items, ForecastItem};
pub use grid::address::AdminAddress;
pub use grid::locate_grid::{AreaEntry, GridLocator};
pub use lake::parquet_sink::{ParquetSink, WriteMode};

pub use types::category::{Category, UntrackedCategory};
pub use types::forecast_record::{ForecastRecord, FORECAST_COLUMNS};
pub use types::grid::{GridCoordinate, DEFAULT_GRID};

pub use transform::clean_day::CLEAN_DAYS;
pub use transform::columns::{ColumnOp, FrameTransformExt, Granularity, RowReducer, Transform};
pub use transform::scalar;
pub use transform::session::{ExecutionMode, FrameSession, SessionConfig, DEFAULT_APP_NAME};

pub use forecast::error::ForecastError;
pub use grid::error::{AreaLevel, LocateGridError};
pub use http::RequestError;
pub use lake::error::LakeError;
pub use transform::error::TransformError;
pub use transform::session::SessionError;
