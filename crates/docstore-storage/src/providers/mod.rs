//! Object storage provider implementations.

pub mod local;
#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;
pub mod signing;

pub use local::LocalObjectStorage;
#[cfg(feature = "memory")]
pub use memory::MemoryObjectStorage;
#[cfg(feature = "s3")]
pub use s3::S3ObjectStorage;
