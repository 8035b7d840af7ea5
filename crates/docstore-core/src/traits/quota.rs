//! Per-owner storage quota bookkeeping.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;

/// Quota bookkeeping consumed by the document engine.
///
/// The check and the adjustment are separate calls; two concurrent uploads
/// may both pass `has_available` and slightly oversubscribe the quota.
#[async_trait]
pub trait QuotaService: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the owner can store `bytes` more bytes.
    async fn has_available(&self, owner_id: Uuid, bytes: i64) -> AppResult<bool>;

    /// Add `delta_bytes` (negative to release) to the owner's used bytes.
    async fn adjust_used(&self, owner_id: Uuid, delta_bytes: i64) -> AppResult<()>;
}
