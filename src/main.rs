//! Service entry point.
//!
//! Wires the configured storage backend, starts the deletion workers, and
//! runs until a termination signal drains everything. The HTTP transport
//! attaches to the service handle exposed by the startup context.

use color_eyre::Result;
use dotenv::dotenv;
use tracing::info;

use shortener::config;
use shortener::runtime::{logging, shutdown, startup};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let app_config = config::init_config();
    let _log_guard = logging::init_logging(app_config);

    let ctx = startup::prepare(app_config).await?;
    info!(
        "Shortener core ready on {} (base url {})",
        app_config.server_address, app_config.base_url
    );

    shutdown::listen_for_shutdown(ctx.storage).await;
    Ok(())
}
