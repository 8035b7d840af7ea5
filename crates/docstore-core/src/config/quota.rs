//! Quota configuration.

use serde::{Deserialize, Serialize};

/// Per-owner storage quota defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Quota assigned to an owner the first time they are seen (default 5 GB).
    #[serde(default = "default_quota_bytes")]
    pub default_quota_bytes: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_quota_bytes: default_quota_bytes(),
        }
    }
}

fn default_quota_bytes() -> i64 {
    5_368_709_120 // 5 GB
}
