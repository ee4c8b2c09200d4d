//! Server startup wiring.

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::ShortenerService;
use crate::storages::{StorageFactory, UrlStorage};

pub struct StartupContext {
    pub storage: Arc<dyn UrlStorage>,
    pub service: Arc<ShortenerService>,
}

/// Wire the configured backend and the service on top of it. For the
/// relational backend this also runs migrations and starts the deletion
/// workers; any failure is fatal to startup.
pub async fn prepare(config: &AppConfig) -> Result<StartupContext> {
    let storage = StorageFactory::create(config).await?;
    let service = Arc::new(ShortenerService::new(Arc::clone(&storage)));
    info!("Storage backend and shortener service initialized");

    Ok(StartupContext { storage, service })
}
