//! Storage quota value object.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quota information for one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageQuota {
    /// The owner this quota belongs to.
    pub owner_id: Uuid,
    /// Total quota in bytes.
    pub total_bytes: i64,
    /// Currently used bytes.
    pub used_bytes: i64,
    /// Bytes still available (never negative).
    pub available_bytes: i64,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl StorageQuota {
    /// Create a quota from total and used values.
    pub fn new(owner_id: Uuid, total_bytes: i64, used_bytes: i64) -> Self {
        let usage_percent = if total_bytes <= 0 {
            0.0
        } else {
            (used_bytes as f64 / total_bytes as f64) * 100.0
        };
        Self {
            owner_id,
            total_bytes,
            used_bytes,
            available_bytes: (total_bytes - used_bytes).max(0),
            usage_percent,
        }
    }

    /// Check if adding the given number of bytes would exceed the quota.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        self.used_bytes.saturating_add(additional_bytes) > self.total_bytes
    }
}
