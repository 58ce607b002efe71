use crate::forecast::error::ForecastError;
use crate::grid::error::LocateGridError;
use crate::http::RequestError;
use crate::lake::error::LakeError;
use crate::transform::error::TransformError;
use crate::transform::session::SessionError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KmaError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    LocateGrid(#[from] LocateGridError),

    #[error(transparent)]
    Lake(#[from] LakeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Invalid configuration")]
    Config(#[from] envy::Error),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to build the weather table row")]
    Polars(#[from] PolarsError),
}
