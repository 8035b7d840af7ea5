//! In-memory object storage for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::{ByteStream, ObjectStorage, PresignedUrl, StorageObjectMeta};

use super::signing::{SignedOp, UrlSigner};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    modified: DateTime<Utc>,
}

/// Object storage backed by a `HashMap` behind a [`RwLock`].
#[derive(Debug)]
pub struct MemoryObjectStorage {
    objects: RwLock<HashMap<String, StoredObject>>,
    signer: UrlSigner,
}

impl Default for MemoryObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            signer: UrlSigner::new("memory://objects", "memory"),
        }
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether no objects are stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn get(&self, key: &str) -> AppResult<StoredObject> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }
}

fn expiry(expires_in: Duration) -> AppResult<DateTime<Utc>> {
    chrono::Duration::from_std(expires_in)
        .map(|d| Utc::now() + d)
        .map_err(|_| AppError::validation("Presigned URL lifetime is out of range"))
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn upload(&self, key: &str, data: Bytes, content_type: Option<&str>) -> AppResult<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
                modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn download(&self, key: &str) -> AppResult<Bytes> {
        Ok(self.get(key).await?.data)
    }

    async fn download_stream(&self, key: &str) -> AppResult<ByteStream> {
        let data = self.get(key).await?.data;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Object not found: {key}")))
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let mut object = self.get(from).await?;
        object.modified = Utc::now();
        self.objects.write().await.insert(to.to_string(), object);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let object = self.get(key).await?;
        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: object.data.len() as u64,
            content_type: object.content_type,
            last_modified: Some(object.modified),
        })
    }

    async fn presigned_upload_url(
        &self,
        key: &str,
        _content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        Ok(self.signer.sign(SignedOp::Put, key, expiry(expires_in)?))
    }

    async fn presigned_download_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        Ok(self.signer.sign(SignedOp::Get, key, expiry(expires_in)?))
    }
}
