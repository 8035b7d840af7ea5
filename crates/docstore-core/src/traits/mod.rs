//! Capability traits defined in `docstore-core` and implemented by other crates.

pub mod quota;
pub mod storage;

pub use quota::QuotaService;
pub use storage::{ByteStream, ObjectStorage, PresignedUrl, StorageObjectMeta};
