use polars::prelude::{DataType, PolarsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error("Column '{column}' has type {dtype}, expected a datetime, date or text column")]
    UnsupportedType { column: String, dtype: DataType },
}
