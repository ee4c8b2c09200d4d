//! Graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storages::UrlStorage;

/// Outer bound on "stop accepting + drain + close".
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Block until SIGINT, then close the storage within the shutdown timeout.
///
/// For the relational backend, closing drains the deletion queue and waits
/// for the workers before releasing the pool; for the file backend it is a
/// final flush. A backend that cannot drain in time forces a nonzero exit.
pub async fn listen_for_shutdown(storage: Arc<dyn UrlStorage>) {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, draining...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    let shutdown_result = timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), async {
        if let Err(e) = storage.close().await {
            error!("Failed to close storage cleanly: {}", e);
        }
    })
    .await;

    match shutdown_result {
        Ok(()) => {
            info!("Storage closed, shutting down");
        }
        Err(_) => {
            error!(
                "Storage close did not finish within {} seconds! Forcing exit.",
                SHUTDOWN_TIMEOUT_SECS
            );
            std::process::exit(1);
        }
    }
}
