//! In-memory metadata stores.
//!
//! Records live in `HashMap`s behind a tokio [`RwLock`](tokio::sync::RwLock),
//! so every trait method works on `&self`. They mirror the PostgreSQL
//! repositories closely enough to drive the engine tests, including the
//! case-insensitive sibling-name constraint.

mod document;
mod folder;
mod quota;

pub use document::MemoryDocumentStore;
pub use folder::MemoryFolderStore;
pub use quota::MemoryQuotaStore;
