//! Storage backends for shortened URLs.
//!
//! Three interchangeable implementations sit behind [`UrlStorage`]:
//! - [`MemoryStorage`]: concurrent map, development only;
//! - [`FileStorage`]: map persisted to a single JSON file;
//! - [`PostgresStorage`]: the fully featured backend, owner listing and the
//!   asynchronous deletion pipeline included.
//!
//! The service layer never branches on the concrete backend; the factory
//! picks one at startup from configuration.

pub mod delete;
pub mod file;
pub mod memory;
pub mod models;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{Result, ShortenerError};

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use models::{DeleteTask, StoreStats, StoredUrlRecord, UserUrl};
pub use postgres::PostgresStorage;

#[async_trait]
pub trait UrlStorage: Send + Sync {
    /// Persist a new mapping.
    ///
    /// The relational backend refuses a duplicate `original_url` with
    /// [`ShortenerError::Conflict`] carrying the existing short code. The
    /// memory and file backends overwrite on a duplicate `short_code`; the
    /// service's pre-check keeps that path from firing in practice.
    async fn store(&self, short_code: &str, original_url: &str, owner_id: &str) -> Result<()>;

    /// Resolve a short code to its original URL.
    ///
    /// Returns [`ShortenerError::NotFound`] for an unknown code and
    /// [`ShortenerError::Gone`] for a tombstoned one.
    async fn get(&self, short_code: &str) -> Result<String>;

    /// All mappings owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<UserUrl>>;

    /// Queue the owner's short codes for tombstoning and return immediately.
    /// Fire-and-forget: overflow and backend failures are logged, never
    /// surfaced.
    fn delete_batch(&self, owner_id: &str, short_codes: Vec<String>);

    /// Backend liveness probe.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    /// Aggregate counters; relational backend only.
    async fn stats(&self) -> Result<StoreStats> {
        Err(ShortenerError::not_implemented(
            "stats is only available on the relational backend",
        ))
    }

    /// Flush durable state and release resources. For the relational backend
    /// this drains the deletion queue before closing the pool.
    async fn close(&self) -> Result<()>;
}

pub struct StorageFactory;

impl StorageFactory {
    /// Select a backend from configuration: DSN -> Postgres, file path ->
    /// file, otherwise memory. Connection and migration failures are fatal
    /// to startup and propagate to the caller.
    pub async fn create(config: &AppConfig) -> Result<Arc<dyn UrlStorage>> {
        if let Some(dsn) = &config.database_dsn {
            info!("Using postgres storage backend");
            Ok(Arc::new(PostgresStorage::connect(dsn).await?))
        } else if let Some(path) = &config.file_storage_path {
            info!("Using file storage backend at {}", path);
            Ok(Arc::new(FileStorage::new(path)))
        } else {
            info!("Using in-memory storage backend");
            Ok(Arc::new(MemoryStorage::new()))
        }
    }
}
