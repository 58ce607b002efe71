//! Address → forecast grid resolution through the KMA `DFSROOT` point tables.
//!
//! The tables form a three-level tree: `top.json.txt` lists provinces,
//! `mdl.<province code>.json.txt` lists the sub-regions of one province, and
//! `leaf.<sub-region code>.json.txt` lists neighborhoods with their grid cell.

use crate::grid::address::AdminAddress;
use crate::grid::error::{AreaLevel, LocateGridError};
use crate::http::HttpFetcher;
use crate::types::grid::{GridCoordinate, DEFAULT_GRID};
use crate::types::loose_string::{loose_opt_i32, loose_string};
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

const TABLE_SUFFIX: &str = ".json.txt";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// One row of a point table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaEntry {
    pub code: String,
    pub value: String,
    /// Only present on leaf (neighborhood) tables.
    pub grid: Option<GridCoordinate>,
}

#[derive(Deserialize)]
struct RawAreaEntry {
    #[serde(deserialize_with = "loose_string")]
    code: String,
    value: String,
    #[serde(default, deserialize_with = "loose_opt_i32")]
    x: Option<i32>,
    #[serde(default, deserialize_with = "loose_opt_i32")]
    y: Option<i32>,
}

impl From<RawAreaEntry> for AreaEntry {
    fn from(raw: RawAreaEntry) -> Self {
        let grid = match (raw.x, raw.y) {
            (Some(x), Some(y)) => Some(GridCoordinate::new(x, y)),
            _ => None,
        };
        AreaEntry {
            code: raw.code,
            value: raw.value,
            grid,
        }
    }
}

/// Finds the entry named `name`. When a table repeats a name, the last
/// occurrence wins.
fn find_entry<'a>(table: &'a [AreaEntry], name: &str) -> Option<&'a AreaEntry> {
    table.iter().rev().find(|entry| entry.value == name)
}

/// Codes end up in request URLs and cache file names, so only ASCII
/// alphanumerics are accepted.
fn area_code(entry: &AreaEntry, level: AreaLevel) -> Result<&str, LocateGridError> {
    if !entry.code.is_empty() && entry.code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(&entry.code)
    } else {
        Err(LocateGridError::InvalidAreaCode {
            level,
            code: entry.code.clone(),
        })
    }
}

pub struct GridLocator {
    http: HttpFetcher,
    base_url: String,
    cache_dir: Option<PathBuf>,
    tables: Mutex<HashMap<String, Vec<AreaEntry>>>,
}

impl GridLocator {
    pub(crate) fn new(http: HttpFetcher, base_url: &str, cache_dir: Option<&Path>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache_dir: cache_dir.map(Path::to_path_buf),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves `address` to its grid cell, reporting why it could not be resolved.
    pub async fn resolve(&self, address: &str) -> Result<GridCoordinate, LocateGridError> {
        let address = AdminAddress::parse(address)?;

        let top = self.table("top").await?;
        let province = find_entry(&top, address.province).ok_or_else(|| LocateGridError::UnknownArea {
            level: AreaLevel::Province,
            name: address.province.to_string(),
        })?;

        let mdl = self
            .table(&format!("mdl.{}", area_code(province, AreaLevel::Province)?))
            .await?;
        let sub_region = find_entry(&mdl, address.sub_region).ok_or_else(|| LocateGridError::UnknownArea {
            level: AreaLevel::SubRegion,
            name: address.sub_region.to_string(),
        })?;

        let leaf = self
            .table(&format!("leaf.{}", area_code(sub_region, AreaLevel::SubRegion)?))
            .await?;
        let neighborhood = find_entry(&leaf, address.neighborhood).ok_or_else(|| LocateGridError::UnknownArea {
            level: AreaLevel::Neighborhood,
            name: address.neighborhood.to_string(),
        })?;

        let grid = neighborhood
            .grid
            .ok_or_else(|| LocateGridError::MissingCoordinate(address.neighborhood.to_string()))?;
        debug!("Resolved '{} {} {}' to grid {}", address.province, address.sub_region, address.neighborhood, grid);
        Ok(grid)
    }

    /// Resolves `address`, falling back to [`DEFAULT_GRID`] on any failure.
    ///
    /// A typo or an unsupported locality silently yields the default
    /// station's cell; prefer [`GridLocator::resolve`] unless that behaviour
    /// is wanted.
    pub async fn resolve_or_default(&self, address: &str) -> GridCoordinate {
        match self.resolve(address).await {
            Ok(grid) => grid,
            Err(e) => {
                warn!(
                    "Could not resolve grid for '{}' ({}), falling back to {}",
                    address, e, DEFAULT_GRID
                );
                DEFAULT_GRID
            }
        }
    }

    /// Returns the table `key` from memory, the disk cache, or the network, in that order.
    ///
    /// A cache file that cannot be decoded is deleted and the table is fetched again.
    async fn table(&self, key: &str) -> Result<Vec<AreaEntry>, LocateGridError> {
        {
            let tables = self.tables.lock().await;
            if let Some(table) = tables.get(key) {
                return Ok(table.clone());
            }
        }

        let cache_path = self.cache_file(key);
        let cached = match &cache_path {
            Some(path) if path.exists() => {
                let path_clone = path.clone();
                match tokio::task::spawn_blocking(move || Self::read_cached_table(&path_clone)).await? {
                    Ok(table) => Some(table),
                    Err(LocateGridError::CacheDecode(path, e)) => {
                        warn!("Discarding unreadable cache file {} ({})", path.display(), e);
                        if let Err(e) = tokio::fs::remove_file(&path).await {
                            warn!("Could not remove {}: {}", path.display(), e);
                        }
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => None,
        };

        let table = match cached {
            Some(table) => table,
            None => {
                let table = self.fetch_table(key).await?;
                if let Some(path) = cache_path {
                    Self::cache_table(table.clone(), path).await?;
                }
                table
            }
        };

        let mut tables = self.tables.lock().await;
        Ok(tables.entry(key.to_string()).or_insert(table).clone())
    }

    fn cache_file(&self, key: &str) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("grid-{}.bin", key)))
    }

    async fn fetch_table(&self, key: &str) -> Result<Vec<AreaEntry>, LocateGridError> {
        let url = format!("{}/{}{}", self.base_url, key, TABLE_SUFFIX);
        info!("Fetching area table {}", url);
        let bytes = self.http.get_bytes(&url).await?;
        // The endpoint mislabels its charset; the body is always UTF-8.
        let raw: Vec<RawAreaEntry> =
            serde_json::from_slice(&bytes).map_err(|e| LocateGridError::JsonParse {
                table: key.to_string(),
                source: e,
            })?;
        Ok(raw.into_iter().map(AreaEntry::from).collect())
    }

    fn read_cached_table(path: &Path) -> Result<Vec<AreaEntry>, LocateGridError> {
        let bytes =
            std::fs::read(path).map_err(|e| LocateGridError::CacheRead(path.to_path_buf(), e))?;
        let (table, _) = bincode::serde::decode_from_slice::<Vec<AreaEntry>, _>(&bytes, BINCODE_CONFIG)
            .map_err(|e| LocateGridError::CacheDecode(path.to_path_buf(), Box::new(e)))?;
        Ok(table)
    }

    /// Writes atomically through a temporary file in the cache directory.
    async fn cache_table(table: Vec<AreaEntry>, path: PathBuf) -> Result<(), LocateGridError> {
        tokio::task::spawn_blocking(move || -> Result<(), LocateGridError> {
            let data = bincode::serde::encode_to_vec(table, BINCODE_CONFIG)
                .map_err(|e| LocateGridError::CacheEncode(Box::new(e)))?;
            let dir = path.parent().unwrap_or(Path::new("."));
            let mut temp_file = NamedTempFile::new_in(dir)
                .map_err(|e| LocateGridError::CacheWrite(path.clone(), e))?;
            temp_file
                .write_all(&data)
                .map_err(|e| LocateGridError::CacheWrite(path.clone(), e))?;
            temp_file
                .persist(&path)
                .map_err(|e| LocateGridError::CacheWrite(path.clone(), e.error))?;
            debug!("Cached area table ({} bytes) to {}", data.len(), path.display());
            Ok(())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOP: &str = r#"[{"code":"11","value":"서울특별시"},{"code":"44","value":"충청남도"}]"#;
    const MDL_44: &str = r#"[{"code":"44130","value":"천안시동남구"},{"code":"44133","value":"천안시서북구"}]"#;
    const LEAF_44133: &str = r#"[{"code":"4413357000","value":"성정1동","x":"63","y":"110"},{"code":"4413362000","value":"부성동","x":"63","y":"111"}]"#;

    fn http() -> HttpFetcher {
        HttpFetcher::new(
            Duration::from_secs(5),
            RetryConfig {
                max_attempts: 1,
                ..RetryConfig::default()
            },
        )
        .unwrap()
    }

    async fn mount_table(server: &MockServer, name: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/{}.json.txt", name)))
            .respond_with(
                // Declared charset is wrong on purpose; decoding must ignore it.
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain; charset=ISO-8859-1")
                    .set_body_bytes(body.as_bytes()),
            )
            .mount(server)
            .await;
    }

    async fn full_server() -> MockServer {
        let server = MockServer::start().await;
        mount_table(&server, "top", TOP).await;
        mount_table(&server, "mdl.44", MDL_44).await;
        mount_table(&server, "leaf.44133", LEAF_44133).await;
        server
    }

    #[tokio::test]
    async fn test_resolve_three_levels() {
        let server = full_server().await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        let grid = locator.resolve("충청남도 천안시서북구 부성동").await.unwrap();
        assert_eq!(grid, GridCoordinate::new(63, 111));

        let grid = locator.resolve("충청남도 천안시서북구 성정1동").await.unwrap();
        assert_eq!(grid, GridCoordinate::new(63, 110));
    }

    #[tokio::test]
    async fn test_unknown_sub_region_is_typed() {
        let server = full_server().await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        let err = locator.resolve("충청남도 아산시 온양1동").await.unwrap_err();
        match err {
            LocateGridError::UnknownArea { level, name } => {
                assert_eq!(level, AreaLevel::SubRegion);
                assert_eq!(name, "아산시");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_level_failure_falls_back_to_default() {
        let server = MockServer::start().await;
        mount_table(&server, "top", TOP).await;
        Mock::given(method("GET"))
            .and(path("/mdl.44.json.txt"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        assert!(matches!(
            locator.resolve("충청남도 천안시서북구 부성동").await,
            Err(LocateGridError::Request(_))
        ));
        assert_eq!(
            locator.resolve_or_default("충청남도 천안시서북구 부성동").await,
            GridCoordinate::new(63, 111)
        );
    }

    #[tokio::test]
    async fn test_malformed_address_falls_back_to_default() {
        let server = MockServer::start().await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        assert!(matches!(
            locator.resolve("충청남도 천안시서북구").await,
            Err(LocateGridError::MalformedAddress(_))
        ));
        assert_eq!(locator.resolve_or_default("충청남도").await, DEFAULT_GRID);
    }

    #[tokio::test]
    async fn test_leaf_without_coordinate() {
        let server = MockServer::start().await;
        mount_table(&server, "top", TOP).await;
        mount_table(&server, "mdl.44", MDL_44).await;
        mount_table(&server, "leaf.44133", r#"[{"code":"4413362000","value":"부성동"}]"#).await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        assert!(matches!(
            locator.resolve("충청남도 천안시서북구 부성동").await,
            Err(LocateGridError::MissingCoordinate(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_names_last_wins() {
        let server = MockServer::start().await;
        mount_table(&server, "top", r#"[{"code":"43","value":"충청남도"},{"code":"44","value":"충청남도"}]"#).await;
        mount_table(&server, "mdl.44", MDL_44).await;
        mount_table(&server, "leaf.44133", LEAF_44133).await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        assert_eq!(
            locator.resolve("충청남도 천안시서북구 부성동").await.unwrap(),
            GridCoordinate::new(63, 111)
        );
    }

    #[tokio::test]
    async fn test_tables_are_fetched_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/top.json.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TOP))
            .expect(1)
            .mount(&server)
            .await;
        mount_table(&server, "mdl.44", MDL_44).await;
        mount_table(&server, "leaf.44133", LEAF_44133).await;
        let locator = GridLocator::new(http(), &server.uri(), None);

        for _ in 0..3 {
            locator.resolve("충청남도 천안시서북구 부성동").await.unwrap();
        }
        server.verify().await;
    }

    #[tokio::test]
    async fn test_disk_cache_survives_new_locator() {
        let cache = TempDir::new().unwrap();
        let server = full_server().await;

        let locator = GridLocator::new(http(), &server.uri(), Some(cache.path()));
        locator.resolve("충청남도 천안시서북구 부성동").await.unwrap();
        assert!(cache.path().join("grid-top.bin").exists());
        assert!(cache.path().join("grid-leaf.44133.bin").exists());

        // A server with no tables at all: every lookup must come from disk.
        let empty = MockServer::start().await;
        let cached = GridLocator::new(http(), &empty.uri(), Some(cache.path()));
        assert_eq!(
            cached.resolve("충청남도 천안시서북구 부성동").await.unwrap(),
            GridCoordinate::new(63, 111)
        );
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_refetched() {
        let cache = TempDir::new().unwrap();
        std::fs::write(cache.path().join("grid-top.bin"), [1u8, 2]).unwrap();
        let server = full_server().await;

        let locator = GridLocator::new(http(), &server.uri(), Some(cache.path()));
        assert_eq!(
            locator.resolve("충청남도 천안시서북구 부성동").await.unwrap(),
            GridCoordinate::new(63, 111)
        );

        // The rewritten cache file decodes again.
        let table = GridLocator::read_cached_table(&cache.path().join("grid-top.bin")).unwrap();
        assert_eq!(table.len(), 2);
        let leftovers: Vec<_> = std::fs::read_dir(cache.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().starts_with("grid-"))
            .collect();
        assert!(leftovers.is_empty(), "temporary files left behind: {leftovers:?}");
    }

    #[tokio::test]
    async fn test_path_like_area_code_is_rejected() {
        let cache = TempDir::new().unwrap();
        let server = MockServer::start().await;
        mount_table(&server, "top", r#"[{"code":"../../44","value":"충청남도"}]"#).await;
        let locator = GridLocator::new(http(), &server.uri(), Some(cache.path()));

        assert!(matches!(
            locator.resolve("충청남도 천안시서북구 부성동").await,
            Err(LocateGridError::InvalidAreaCode { level: AreaLevel::Province, ref code }) if code == "../../44"
        ));
    }
}
