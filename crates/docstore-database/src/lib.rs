//! # docstore-database
//!
//! Metadata store for DocStore: the [`FolderStore`], [`DocumentStore`] and
//! [`QuotaStore`] traits consumed by the engines, their PostgreSQL
//! implementations, PostgreSQL connection management and migrations, and
//! (behind the `memory` feature) in-memory implementations for tests.

pub mod connection;
#[cfg(feature = "memory")]
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{DeletionFilter, DocumentStore, FolderStore, QuotaStore};
