//! In-memory backend for development and tests.
//!
//! A plain map behind one lock. No tombstones, no ownership: `get` never
//! returns `Gone`, listing is unsupported, and deletion is a no-op.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use super::models::UserUrl;
use super::UrlStorage;
use crate::errors::{Result, ShortenerError};

#[derive(Default)]
pub struct MemoryStorage {
    urls: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
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
impl UrlStorage for MemoryStorage {
    async fn store(&self, short_code: &str, original_url: &str, _owner_id: &str) -> Result<()> {
        // Last write wins; the service pre-checks the code before storing.
        self.write_urls()?
            .insert(short_code.to_string(), original_url.to_string());
        Ok(())
    }

    async fn get(&self, short_code: &str) -> Result<String> {
        self.read_urls()?
            .get(short_code)
            .cloned()
            .ok_or_else(|| ShortenerError::not_found(short_code))
    }

    async fn list_by_owner(&self, _owner_id: &str) -> Result<Vec<UserUrl>> {
        Err(ShortenerError::not_implemented(
            "list_by_owner is not supported by the in-memory backend",
        ))
    }

    fn delete_batch(&self, owner_id: &str, short_codes: Vec<String>) {
        debug!(
            "delete_batch is a no-op on the in-memory backend ({} codes for owner {})",
            short_codes.len(),
            owner_id
        );
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
