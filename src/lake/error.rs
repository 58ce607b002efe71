use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LakeError {
    #[error("Failed to create table directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("I/O error reading parquet table '{0}'")]
    ParquetReadIo(PathBuf, #[source] std::io::Error),
    #[error("Decoding error reading parquet table '{0}'")]
    ParquetReadPolars(PathBuf, #[source] PolarsError),

    #[error("I/O error writing parquet table '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing parquet table '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("New rows do not fit the schema of '{0}'")]
    SchemaMismatch(PathBuf, #[source] PolarsError),

    #[error("Failed to scan parquet table '{0}'")]
    ParquetScan(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
