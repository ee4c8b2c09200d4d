//! Data model shared by the storage backends.

use serde::{Deserialize, Serialize};

/// A single shortened URL as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

/// Deletion intent flowing through the bounded queue.
#[derive(Debug, Clone)]
pub struct DeleteTask {
    pub owner_id: String,
    pub short_code: String,
}

/// Aggregate service counters (relational backend only).
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StoreStats {
    /// Live (non-tombstoned) URLs.
    pub urls: i64,
    /// Distinct owners, tombstoned records included.
    pub users: i64,
}

/// On-disk record for the file backend.
///
/// The `uuid` field is opaque to the core and regenerated on every save; it
/// exists for compatibility with the historical file layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUrlRecord {
    pub uuid: String,
    pub short_url: String,
    pub original_url: String,
}
