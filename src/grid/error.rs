use crate::http::RequestError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The three levels of a KMA administrative address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaLevel {
    Province,
    SubRegion,
    Neighborhood,
}

impl fmt::Display for AreaLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AreaLevel::Province => "province",
            AreaLevel::SubRegion => "sub-region",
            AreaLevel::Neighborhood => "neighborhood",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error)]
pub enum LocateGridError {
    #[error("Address '{0}' must have exactly three parts: province, sub-region and neighborhood")]
    MalformedAddress(String),

    #[error("Unknown {level} '{name}'")]
    UnknownArea { level: AreaLevel, name: String },

    #[error("Area table returned an invalid {level} code '{code}'")]
    InvalidAreaCode { level: AreaLevel, code: String },

    #[error("Neighborhood '{0}' has no grid coordinate")]
    MissingCoordinate(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Failed to parse area table '{table}'")]
    JsonParse {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read cache file '{0}'")]
    CacheRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write cache file '{0}'")]
    CacheWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode cache data from '{0}'")]
    CacheDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode cache data")]
    CacheEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
