use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use docstore_core::result::AppResult;
use docstore_core::traits::QuotaService;
use docstore_entity::quota::StorageQuota;

use crate::store::QuotaStore;

#[derive(Debug, Clone, Copy)]
struct QuotaEntry {
    total_bytes: i64,
    used_bytes: i64,
}

/// In-memory [`QuotaStore`] backed by a [`DashMap`].
#[derive(Debug)]
pub struct MemoryQuotaStore {
    entries: DashMap<Uuid, QuotaEntry>,
    default_quota_bytes: i64,
}

impl MemoryQuotaStore {
    /// Create a store granting `default_quota_bytes` to every new owner.
    pub fn new(default_quota_bytes: i64) -> Self {
        Self {
            entries: DashMap::new(),
            default_quota_bytes,
        }
    }

    /// Override the total quota of one owner.
    pub fn set_total(&self, owner_id: Uuid, total_bytes: i64) {
        self.entry(owner_id).total_bytes = total_bytes;
    }

    fn entry(&self, owner_id: Uuid) -> dashmap::mapref::one::RefMut<'_, Uuid, QuotaEntry> {
        self.entries.entry(owner_id).or_insert(QuotaEntry {
            total_bytes: self.default_quota_bytes,
            used_bytes: 0,
        })
    }
}

#[async_trait]
impl QuotaService for MemoryQuotaStore {
    async fn has_available(&self, owner_id: Uuid, bytes: i64) -> AppResult<bool> {
        Ok(!self.get_quota(owner_id).await?.would_exceed(bytes))
    }

    async fn adjust_used(&self, owner_id: Uuid, delta_bytes: i64) -> AppResult<()> {
        let mut entry = self.entry(owner_id);
        entry.used_bytes = entry.used_bytes.saturating_add(delta_bytes).max(0);
        Ok(())
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn get_quota(&self, owner_id: Uuid) -> AppResult<StorageQuota> {
        let entry = *self.entry(owner_id);
        Ok(StorageQuota::new(
            owner_id,
            entry.total_bytes,
            entry.used_bytes,
        ))
    }
}
