//! Logging system initialization.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Initialize the tracing subscriber from configuration.
///
/// Call once at startup and keep the returned guard alive for the life of
/// the process so buffered log lines are flushed on exit. If the configured
/// log file cannot be opened, logging falls back to stdout.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let writer: Box<dyn std::io::Write + Send + Sync> = match &config.log_file {
        Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!(
                    "Failed to open log file '{}': {}. Falling back to stdout.",
                    path, e
                );
                Box::new(std::io::stdout())
            }
        },
        None => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = EnvFilter::new(config.log_level.clone());

    tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.log_file.is_none())
        .init();

    guard
}
