//! Shortener - URL shortening service core
//!
//! This library provides the persistence and deletion engine of the service:
//! pluggable storage backends, the uniqueness/conflict protocol, short-code
//! allocation with collision retry, and the asynchronous soft-delete
//! pipeline. The transport layer attaches to [`services::ShortenerService`].
//!
//! # Architecture
//! - `config`: environment-based configuration
//! - `errors`: crate-wide error types
//! - `storages`: storage backends and the deletion pipeline
//! - `services`: business logic on top of a backend
//! - `runtime`: application lifecycle (startup, logging, shutdown)
//! - `utils`: short-code generation

pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storages;
pub mod utils;
