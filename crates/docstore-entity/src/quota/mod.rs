//! Per-owner storage quota.

pub mod model;

pub use model::StorageQuota;
