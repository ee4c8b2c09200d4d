//! Environment-based configuration.
//!
//! Configuration is read once from the process environment (after `dotenv`
//! has been given a chance to populate it) and cached for the lifetime of the
//! process. The backend selection contract: `DATABASE_DSN` picks the
//! relational backend, otherwise `FILE_STORAGE_PATH` picks the file backend,
//! otherwise the in-memory backend is used.

use std::env;

use once_cell::sync::OnceCell;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the transport layer binds to.
    pub server_address: String,
    /// Prefix prepended to short codes in user-facing listings.
    pub base_url: String,
    /// Postgres DSN; presence selects the relational backend.
    pub database_dsn: Option<String>,
    /// Path to the JSON storage file; selects the file backend when no DSN.
    pub file_storage_path: Option<String>,
    /// Tracing filter directive, e.g. `info` or `shortener=debug`.
    pub log_level: String,
    /// Log destination file; stdout when unset.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server_address: env_or("SERVER_ADDRESS", "localhost:8080"),
            base_url: env_or("BASE_URL", "http://localhost:8080"),
            database_dsn: env_opt("DATABASE_DSN"),
            file_storage_path: env_opt("FILE_STORAGE_PATH"),
            log_level: env_or("LOG_LEVEL", "info"),
            log_file: env_opt("LOG_FILE"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Empty values count as unset so a deployment can blank a key to fall
/// through to the next backend.
fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Load the configuration from the environment on first call.
pub fn init_config() -> &'static AppConfig {
    CONFIG.get_or_init(AppConfig::from_env)
}

pub fn get_config() -> &'static AppConfig {
    init_config()
}
