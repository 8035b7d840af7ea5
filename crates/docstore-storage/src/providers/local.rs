//! Local filesystem object storage.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::debug;

use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::traits::{ByteStream, ObjectStorage, PresignedUrl, StorageObjectMeta};

use super::signing::{SignedOp, UrlSigner};
use crate::mime::mime_from_path;

/// Local filesystem object storage. Keys map to relative paths under a root.
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
    signer: UrlSigner,
}

impl LocalObjectStorage {
    /// Create a new local storage rooted at `root_path`, creating it if needed.
    pub async fn new(root_path: &str, public_base_url: &str, signing_secret: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            signer: UrlSigner::new(public_base_url, signing_secret),
        })
    }

    /// Check a signature from a URL produced by this storage.
    pub fn verify_signature(
        &self,
        key: &str,
        op: SignedOp,
        expires: i64,
        signature: &str,
    ) -> bool {
        self.signer.verify(op, key, expires, signature, Utc::now())
    }

    /// Resolve a key to a path inside the root, rejecting traversal.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(AppError::validation(format!("Invalid storage key: {key}")));
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn io_err(key: &str, action: &str) -> impl FnOnce(std::io::Error) -> AppError {
    let message = format!("Failed to {action} object: {key}");
    let missing = format!("Object not found: {key}");
    move |e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::not_found(missing)
        } else {
            AppError::with_source(ErrorKind::Storage, message, e)
        }
    }
}

fn expiry(expires_in: Duration) -> AppResult<DateTime<Utc>> {
    chrono::Duration::from_std(expires_in)
        .map(|d| Utc::now() + d)
        .map_err(|_| AppError::validation("Presigned URL lifetime is out of range"))
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn upload(&self, key: &str, data: Bytes, _content_type: Option<&str>) -> AppResult<()> {
        let path = self.resolve(key)?;
        self.ensure_parent(&path).await?;
        fs::write(&path, &data).await.map_err(io_err(key, "write"))?;
        debug!(key, bytes = data.len(), "Stored object");
        Ok(())
    }

    async fn download(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path).await.map_err(io_err(key, "read"))?;
        Ok(Bytes::from(data))
    }

    async fn download_stream(&self, key: &str) -> AppResult<ByteStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path).await.map_err(io_err(key, "open"))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        fs::remove_file(&path).await.map_err(io_err(key, "delete"))?;
        debug!(key, "Deleted object");
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;
        fs::copy(&from_path, &to_path)
            .await
            .map_err(io_err(from, "copy"))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let path = self.resolve(key)?;
        fs::try_exists(&path).await.map_err(io_err(key, "stat"))
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let path = self.resolve(key)?;
        let meta = fs::metadata(&path).await.map_err(io_err(key, "stat"))?;
        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: meta.len(),
            content_type: mime_from_path(key).map(str::to_string),
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    async fn presigned_upload_url(
        &self,
        key: &str,
        _content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        self.resolve(key)?;
        Ok(self.signer.sign(SignedOp::Put, key, expiry(expires_in)?))
    }

    async fn presigned_download_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        self.resolve(key)?;
        Ok(self.signer.sign(SignedOp::Get, key, expiry(expires_in)?))
    }
}
