use async_trait::async_trait;

use crate::errors::Result;

/// Applies a batch of ownership-scoped tombstones.
///
/// The deletion workers stay backend-agnostic behind this seam; the
/// relational backend implements it as one bulk `UPDATE` per owner group.
/// Tombstoning is idempotent, so re-applying a code is harmless.
#[async_trait]
pub trait TombstoneSink: Send + Sync {
    /// Tombstone the owner's short codes, skipping codes the owner does not
    /// hold. Returns the number of rows newly tombstoned.
    async fn apply_tombstones(&self, owner_id: &str, short_codes: &[String]) -> Result<u64>;
}
