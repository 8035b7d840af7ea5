//! # docstore-storage
//!
//! Object storage providers for DocStore. Every provider implements
//! [`ObjectStorage`](docstore_core::traits::ObjectStorage) and is addressed by
//! opaque storage keys such as `"{owner_id}/{document_id}.pdf"`.

pub mod factory;
pub mod mime;
pub mod providers;

pub use factory::build_storage;
