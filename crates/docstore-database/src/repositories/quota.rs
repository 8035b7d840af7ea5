//! Quota repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use docstore_core::result::AppResult;
use docstore_core::traits::QuotaService;
use docstore_entity::quota::StorageQuota;

use super::db_err;
use crate::store::QuotaStore;

/// Repository for per-owner quota rows in `user_quotas`.
#[derive(Debug, Clone)]
pub struct PgQuotaRepository {
    pool: PgPool,
    default_quota_bytes: i64,
}

impl PgQuotaRepository {
    /// Create a new quota repository. Owners without a row get
    /// `default_quota_bytes`.
    pub fn new(pool: PgPool, default_quota_bytes: i64) -> Self {
        Self {
            pool,
            default_quota_bytes,
        }
    }

    async fn ensure_row(&self, owner_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_quotas (owner_id, total_bytes) VALUES ($1, $2) \
             ON CONFLICT (owner_id) DO NOTHING",
        )
        .bind(owner_id)
        .bind(self.default_quota_bytes)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to initialise quota"))?;
        Ok(())
    }
}

#[async_trait]
impl QuotaService for PgQuotaRepository {
    async fn has_available(&self, owner_id: Uuid, bytes: i64) -> AppResult<bool> {
        let quota = self.get_quota(owner_id).await?;
        Ok(!quota.would_exceed(bytes))
    }

    async fn adjust_used(&self, owner_id: Uuid, delta_bytes: i64) -> AppResult<()> {
        self.ensure_row(owner_id).await?;
        sqlx::query(
            "UPDATE user_quotas SET used_bytes = GREATEST(used_bytes + $2, 0), \
             updated_at = NOW() WHERE owner_id = $1",
        )
        .bind(owner_id)
        .bind(delta_bytes)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to adjust quota usage"))?;
        debug!(owner_id = %owner_id, delta_bytes, "Adjusted quota usage");
        Ok(())
    }
}

#[async_trait]
impl QuotaStore for PgQuotaRepository {
    async fn get_quota(&self, owner_id: Uuid) -> AppResult<StorageQuota> {
        self.ensure_row(owner_id).await?;
        let (total_bytes, used_bytes): (i64, i64) = sqlx::query_as(
            "SELECT total_bytes, used_bytes FROM user_quotas WHERE owner_id = $1",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to load quota"))?;
        Ok(StorageQuota::new(owner_id, total_bytes, used_bytes))
    }
}
