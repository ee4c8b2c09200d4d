//! URL shortening service.
//!
//! Orchestrates short-code allocation with collision retry, conflict
//! resolution on duplicate URLs, per-owner listing, and asynchronous batch
//! deletion on top of whichever backend the factory selected.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{Result, ShortenerError};
use crate::storages::{StoreStats, UrlStorage, UserUrl};
use crate::utils::generate_short_code;

/// Generated short code length.
const CODE_LENGTH: usize = 6;
/// Collision retry bound; guards against a pathological generator.
const MAX_ATTEMPTS: u32 = 1000;
/// Longest accepted original URL, matching the schema check constraint.
const MAX_URL_BYTES: usize = 2048;

/// Source of candidate short codes. The default samples the alphanumeric
/// alphabet; tests substitute a deterministic sequence.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, length: usize) -> String;
}

/// PRNG-backed generator used in production.
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self, length: usize) -> String {
        generate_short_code(length)
    }
}

// ============ Batch DTOs ============

/// One element of a batch shorten request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchShortenItem {
    pub correlation_id: String,
    pub original_url: String,
}

/// One element of a batch shorten response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchShortenResult {
    pub correlation_id: String,
    pub short_url: String,
}

pub struct ShortenerService {
    storage: Arc<dyn UrlStorage>,
    generator: Arc<dyn CodeGenerator>,
}

impl ShortenerService {
    pub fn new(storage: Arc<dyn UrlStorage>) -> Self {
        Self {
            storage,
            generator: Arc::new(RandomCodeGenerator),
        }
    }

    /// Replace the code generator; used by tests to pin the sequence.
    pub fn with_generator(storage: Arc<dyn UrlStorage>, generator: Arc<dyn CodeGenerator>) -> Self {
        Self { storage, generator }
    }

    /// True when the candidate already resolves to a live URL. A tombstoned
    /// or unknown code is free. The probe is optimistic: the backend's
    /// unique constraint remains the final arbiter if two allocations race.
    async fn is_taken(&self, short_code: &str) -> bool {
        self.storage.get(short_code).await.is_ok()
    }

    /// Shorten `original_url` for `owner_id` and return the allocated code.
    ///
    /// Retries generation up to [`MAX_ATTEMPTS`] times when the candidate is
    /// already live, then gives up with `CodeSpaceExhausted`. A duplicate
    /// URL surfaces as [`ShortenerError::Conflict`] with the existing code.
    pub async fn shorten(&self, original_url: &str, owner_id: &str) -> Result<String> {
        if original_url.is_empty() {
            return Err(ShortenerError::validation("original url must not be empty"));
        }
        if original_url.len() > MAX_URL_BYTES {
            return Err(ShortenerError::validation(format!(
                "original url exceeds {} bytes",
                MAX_URL_BYTES
            )));
        }

        for _ in 0..MAX_ATTEMPTS {
            let short_code = self.generator.generate(CODE_LENGTH);
            if self.is_taken(&short_code).await {
                continue;
            }

            self.storage
                .store(&short_code, original_url, owner_id)
                .await?;
            info!("Shortened url for owner {}: {}", owner_id, short_code);
            return Ok(short_code);
        }

        warn!(
            "Could not allocate a free short code after {} attempts",
            MAX_ATTEMPTS
        );
        Err(ShortenerError::CodeSpaceExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Resolve a short code to its original URL, preserving the distinction
    /// between a code that never existed and one that was deleted.
    pub async fn resolve(&self, short_code: &str) -> Result<String> {
        self.storage.get(short_code).await
    }

    /// All of the owner's urls with `base_url` prepended, newest first.
    pub async fn list_user_urls(&self, owner_id: &str, base_url: &str) -> Result<Vec<UserUrl>> {
        let mut urls = self.storage.list_by_owner(owner_id).await?;
        for url in &mut urls {
            url.short_url = format!("{}/{}", base_url, url.short_url);
        }
        Ok(urls)
    }

    /// Queue the owner's short codes for asynchronous tombstoning and return
    /// immediately. Codes the owner does not hold are silently skipped.
    pub fn delete_user_urls(&self, owner_id: &str, short_codes: Vec<String>) {
        self.storage.delete_batch(owner_id, short_codes);
    }

    /// Shorten a correlated batch. An already-mapped URL resolves to its
    /// existing short code instead of failing the batch; any other error
    /// aborts it.
    pub async fn shorten_batch(
        &self,
        items: Vec<BatchShortenItem>,
        owner_id: &str,
        base_url: &str,
    ) -> Result<Vec<BatchShortenResult>> {
        let mut results = Vec::with_capacity(items.len());
        for item in items {
            let short_code = match self.shorten(&item.original_url, owner_id).await {
                Ok(code) => code,
                Err(ShortenerError::Conflict { existing_code }) => existing_code,
                Err(e) => return Err(e),
            };
            results.push(BatchShortenResult {
                correlation_id: item.correlation_id,
                short_url: format!("{}/{}", base_url, short_code),
            });
        }
        Ok(results)
    }

    /// Backend liveness probe.
    pub async fn ping(&self) -> Result<()> {
        self.storage.ping().await
    }

    /// Aggregate counters; relational backend only.
    pub async fn stats(&self) -> Result<StoreStats> {
        self.storage.stats().await
    }
}
