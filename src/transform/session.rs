//! An explicitly owned handle for batch transform jobs over the lake.

use crate::lake::error::LakeError;
use crate::lake::parquet_sink::{ParquetSink, WriteMode};
use crate::transform::columns::{ColumnOp, FrameTransformExt};
use crate::transform::error::TransformError;
use bon::bon;
use log::{debug, info};
use polars::prelude::{DataFrame, LazyFrame};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task;

pub const DEFAULT_APP_NAME: &str = "kma_weather";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid execution mode '{0}', expected local, local[*] or local[N]")]
    InvalidMode(String),

    #[error("Failed to create warehouse directory '{0}'")]
    WarehouseCreation(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Lake(#[from] LakeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("Session '{0}' is closed")]
    Closed(String),

    #[error("Transform task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// How many transform jobs a session runs at once, written in the
/// `local[...]` master notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// `local[*]`: one worker per core.
    #[default]
    AllCores,
    /// `local[N]`, or `local` for a single thread.
    Threads(NonZeroUsize),
}

impl ExecutionMode {
    pub fn threads(&self) -> Option<NonZeroUsize> {
        match self {
            ExecutionMode::AllCores => None,
            ExecutionMode::Threads(n) => Some(*n),
        }
    }

    /// Number of concurrent workers; `local[*]` uses the available parallelism.
    pub fn workers(&self) -> usize {
        match self {
            ExecutionMode::AllCores => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            ExecutionMode::Threads(n) => n.get(),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SessionError::InvalidMode(s.to_string());
        let s = s.trim();
        if s == "local" {
            return Ok(ExecutionMode::Threads(NonZeroUsize::MIN));
        }
        let inner = s
            .strip_prefix("local[")
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(invalid)?;
        if inner == "*" {
            return Ok(ExecutionMode::AllCores);
        }
        inner
            .parse::<NonZeroUsize>()
            .map(ExecutionMode::Threads)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::AllCores => write!(f, "local[*]"),
            ExecutionMode::Threads(n) => write!(f, "local[{}]", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Root directory tables are resolved against.
    pub warehouse: PathBuf,
    pub app_name: String,
    pub mode: ExecutionMode,
}

#[bon]
impl SessionConfig {
    #[builder]
    pub fn new(
        #[builder(into)] warehouse: PathBuf,
        #[builder(into)] app_name: Option<String>,
        mode: Option<ExecutionMode>,
    ) -> Self {
        Self {
            warehouse,
            app_name: app_name.unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            mode: mode.unwrap_or_default(),
        }
    }
}

/// Engine session for transform jobs.
///
/// Created once by the job and passed to whatever needs it. Transforms run
/// on blocking threads, at most [`ExecutionMode::workers`] at a time.
/// Dropping the session releases it too; [`FrameSession::close`] does so
/// with a log line.
#[derive(Debug)]
pub struct FrameSession {
    config: SessionConfig,
    workers: Arc<Semaphore>,
}

impl FrameSession {
    /// Opens a session, creating the warehouse directory when missing.
    pub async fn new(config: SessionConfig) -> Result<Self, SessionError> {
        tokio::fs::create_dir_all(&config.warehouse)
            .await
            .map_err(|e| SessionError::WarehouseCreation(config.warehouse.clone(), e))?;

        let workers = Arc::new(Semaphore::new(config.mode.workers()));
        info!(
            "Opened session '{}' ({}, {} workers) on {}",
            config.app_name,
            config.mode,
            config.mode.workers(),
            config.warehouse.display()
        );
        Ok(Self { config, workers })
    }

    pub fn app_name(&self) -> &str {
        &self.config.app_name
    }

    pub fn mode(&self) -> ExecutionMode {
        self.config.mode
    }

    pub fn warehouse(&self) -> &Path {
        &self.config.warehouse
    }

    /// Location of a table given by its path relative to the warehouse,
    /// e.g. `weather/kma/weather.parquet`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.config.warehouse.join(table.trim_start_matches('/'))
    }

    fn sink(&self, table: &str) -> ParquetSink {
        ParquetSink::new(self.table_path(table))
    }

    pub fn scan(&self, table: &str) -> Result<LazyFrame, SessionError> {
        Ok(self.sink(table).scan()?)
    }

    pub async fn read(&self, table: &str) -> Result<DataFrame, SessionError> {
        Ok(self.sink(table).read().await?)
    }

    /// Writes `df` to `table` and returns the number of rows the table now holds.
    pub async fn write(
        &self,
        table: &str,
        df: DataFrame,
        mode: WriteMode,
    ) -> Result<usize, SessionError> {
        Ok(self.sink(table).write(df, mode).await?)
    }

    /// Applies `ops` to `df` on a blocking thread once a worker is free.
    pub async fn transform(
        &self,
        df: DataFrame,
        ops: &[ColumnOp],
    ) -> Result<DataFrame, SessionError> {
        let permit = self
            .workers
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| SessionError::Closed(self.config.app_name.clone()))?;
        debug!("Session '{}' applying {} column ops", self.app_name(), ops.len());

        let ops = ops.to_vec();
        let df = task::spawn_blocking(move || {
            let _permit = permit;
            df.apply_ops(&ops)
        })
        .await??;
        Ok(df)
    }

    pub fn close(self) {
        self.workers.close();
        info!("Closed session '{}'", self.config.app_name);
    }
}
