use crate::lake::error::LakeError;
use log::info;
use polars::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tokio::task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Add the new rows after the rows already in the table.
    #[default]
    Append,
    /// Replace the table with the new rows.
    Overwrite,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::Overwrite => write!(f, "overwrite"),
        }
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "append" => Ok(WriteMode::Append),
            "overwrite" => Ok(WriteMode::Overwrite),
            other => Err(format!("unknown write mode '{}', expected append or overwrite", other)),
        }
    }
}

/// A single-file Parquet table in the lake.
///
/// Writes go to a temporary file next to the table and are renamed into
/// place, so readers never observe a half-written table.
#[derive(Debug, Clone)]
pub struct ParquetSink {
    path: PathBuf,
}

impl ParquetSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `df` to the table and returns the number of rows the table now holds.
    pub async fn write(&self, df: DataFrame, mode: WriteMode) -> Result<usize, LakeError> {
        let path = self.path.clone();
        let rows = task::spawn_blocking(move || Self::write_blocking(&path, df, mode)).await??;
        info!("Wrote table {} ({} mode, {} rows)", self.path.display(), mode, rows);
        Ok(rows)
    }

    /// Reads the whole table into memory.
    pub async fn read(&self) -> Result<DataFrame, LakeError> {
        let path = self.path.clone();
        task::spawn_blocking(move || Self::read_blocking(&path)).await?
    }

    /// Lazily scans the table.
    pub fn scan(&self) -> Result<LazyFrame, LakeError> {
        LazyFrame::scan_parquet(&self.path, Default::default())
            .map_err(|e| LakeError::ParquetScan(self.path.clone(), e))
    }

    fn read_blocking(path: &Path) -> Result<DataFrame, LakeError> {
        let file = std::fs::File::open(path)
            .map_err(|e| LakeError::ParquetReadIo(path.to_path_buf(), e))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| LakeError::ParquetReadPolars(path.to_path_buf(), e))
    }

    fn write_blocking(path: &Path, df: DataFrame, mode: WriteMode) -> Result<usize, LakeError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| LakeError::DirCreation(dir.clone(), e))?;

        let mut df = if mode == WriteMode::Append && path.exists() {
            let mut existing = Self::read_blocking(path)?;
            existing
                .vstack_mut(&df)
                .map_err(|e| LakeError::SchemaMismatch(path.to_path_buf(), e))?;
            existing
        } else {
            df
        };

        let mut temp_file = NamedTempFile::new_in(&dir)
            .map_err(|e| LakeError::ParquetWriteIo(path.to_path_buf(), e))?;
        ParquetWriter::new(temp_file.as_file_mut())
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| LakeError::ParquetWritePolars(path.to_path_buf(), e))?;
        temp_file
            .persist(path)
            .map_err(|e| LakeError::ParquetWriteIo(path.to_path_buf(), e.error))?;

        Ok(df.height())
    }
}
