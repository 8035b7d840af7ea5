//! Object storage trait for pluggable content backends.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageObjectMeta {
    /// Storage key of the object.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Content type (if known).
    pub content_type: Option<String>,
    /// Last modified timestamp.
    pub last_modified: Option<DateTime<Utc>>,
}

/// A time-limited URL granting direct access to one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUrl {
    /// The URL to hand to the client.
    pub url: String,
    /// HTTP method the URL is valid for (`GET` or `PUT`).
    pub method: String,
    /// When the URL stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// A byte stream type used for reading object contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for object storage backends, keyed by an opaque storage key.
///
/// Implementations exist for the local filesystem, S3-compatible stores,
/// and an in-memory map used in tests. The trait is defined here in
/// `docstore-core` and implemented in `docstore-storage`.
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store an object under `key`, replacing any existing object.
    async fn upload(&self, key: &str, data: Bytes, content_type: Option<&str>) -> AppResult<()>;

    /// Read an object fully into memory.
    async fn download(&self, key: &str) -> AppResult<Bytes>;

    /// Read an object as a byte stream.
    async fn download_stream(&self, key: &str) -> AppResult<ByteStream>;

    /// Delete an object. Missing objects yield a `NotFound` error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Delete several objects, returning how many were removed.
    ///
    /// Missing keys are skipped rather than failing the batch.
    async fn delete_many(&self, keys: &[String]) -> AppResult<u64> {
        let mut removed = 0;
        for key in keys {
            match self.delete(key).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind == crate::error::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// Copy an object to a new key within this provider.
    async fn copy(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Get metadata about an object.
    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta>;

    /// Create a URL a client can `PUT` the object to directly.
    async fn presigned_upload_url(
        &self,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl>;

    /// Create a URL a client can `GET` the object from directly.
    async fn presigned_download_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl>;
}
