use crate::http::RequestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Publication delay must be below 60 minutes, got {0}")]
    InvalidDelay(u32),

    #[error("Base time '{0}' is not in 'YYYYMMDD HHMM' form")]
    InvalidBaseTime(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Failed to parse forecast response")]
    JsonParse(#[from] serde_json::Error),

    #[error("Forecast API returned error {code}: {message}")]
    Api { code: String, message: String },
}
