//! File-backed storage.
//!
//! The whole mapping lives in memory and the JSON file is rewritten on every
//! store, so an abrupt shutdown after any successful write loses nothing.
//! Write serialization comes from holding the map's write lock across the
//! rewrite. Like the in-memory backend, listing and deletion are inert.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{StoredUrlRecord, UserUrl};
use super::UrlStorage;
use crate::errors::{Result, ShortenerError};

pub struct FileStorage {
    urls: RwLock<HashMap<String, String>>,
    path: PathBuf,
}

impl FileStorage {
    /// Open the storage at `path`, populating memory from an existing file.
    ///
    /// A missing or unparsable file yields an empty store rather than a
    /// startup failure.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let urls = match Self::load_records(&path) {
            Ok(urls) => {
                info!("Loaded {} short urls from {}", urls.len(), path.display());
                urls
            }
            Err(e) => {
                warn!(
                    "Could not load url file {}: {}; starting empty",
                    path.display(),
                    e
                );
                HashMap::new()
            }
        };

        Self {
            urls: RwLock::new(urls),
            path,
        }
    }

    fn load_records(path: &Path) -> Result<HashMap<String, String>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path)?;
        let records: Vec<StoredUrlRecord> = serde_json::from_str(&content)?;
        Ok(records
            .into_iter()
            .map(|r| (r.short_url, r.original_url))
            .collect())
    }

    /// Rewrite the whole file from the given map snapshot. Callers hold the
    /// map lock, which serializes writers.
    fn save_to_file(&self, urls: &HashMap<String, String>) -> Result<()> {
        let records: Vec<StoredUrlRecord> = urls
            .iter()
            .map(|(short_url, original_url)| StoredUrlRecord {
                uuid: Uuid::new_v4().to_string(),
                short_url: short_url.clone(),
                original_url: original_url.clone(),
            })
            .collect();

        let json = serde_json::to_string(&records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn read_urls(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.urls
            .read()
            .map_err(|_| ShortenerError::storage("url map lock poisoned"))
    }

    fn write_urls(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.urls
            .write()
            .map_err(|_| ShortenerError::storage("url map lock poisoned"))
    }
}

#[async_trait]
impl UrlStorage for FileStorage {
    async fn store(&self, short_code: &str, original_url: &str, _owner_id: &str) -> Result<()> {
        let mut urls = self.write_urls()?;
        urls.insert(short_code.to_string(), original_url.to_string());
        self.save_to_file(&urls)
    }

    async fn get(&self, short_code: &str) -> Result<String> {
        self.read_urls()?
            .get(short_code)
            .cloned()
            .ok_or_else(|| ShortenerError::not_found(short_code))
    }

    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<UserUrl>> {
        Err(ShortenerError::not_implemented(
            "list_by_owner is not supported by the file backend",
        ))
    }

    fn delete_batch(&self, owner_id: &str, short_codes: Vec<String>) {
        debug!(
            "delete_batch is a no-op on the file backend ({} codes for owner {})",
            short_codes.len(),
            owner_id
        );
    }

    async fn close(&self) -> Result<()> {
        let urls = self.read_urls()?;
        self.save_to_file(&urls)?;
        info!("Flushed {} short urls to {}", urls.len(), self.path.display());
        Ok(())
    }
}
