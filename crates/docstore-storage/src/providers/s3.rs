//! S3-compatible object storage.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream as S3ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use docstore_core::config::S3StorageConfig;
use docstore_core::error::{AppError, ErrorKind};
use docstore_core::result::AppResult;
use docstore_core::traits::{ByteStream, ObjectStorage, PresignedUrl, StorageObjectMeta};

/// Object storage on an S3-compatible service.
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl std::fmt::Debug for S3ObjectStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStorage")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl S3ObjectStorage {
    /// Build a client from configuration.
    ///
    /// Explicit keys must be given together; without them the ambient AWS
    /// credential chain is used.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("storage.s3.bucket must be set"));
        }
        let region = if config.region.is_empty() {
            "us-east-1".to_string()
        } else {
            config.region.clone()
        };

        let mut builder = match (&config.access_key, &config.secret_key) {
            (Some(key_id), Some(secret)) => aws_sdk_s3::config::Builder::new()
                .behavior_version(BehaviorVersion::latest())
                .region(aws_config::Region::new(region.clone()))
                .credentials_provider(aws_sdk_s3::config::Credentials::new(
                    key_id, secret, None, None, "docstore-config",
                )),
            (None, None) => {
                let shared = aws_config::defaults(BehaviorVersion::latest())
                    .region(aws_config::Region::new(region.clone()))
                    .load()
                    .await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
            _ => {
                return Err(AppError::configuration(
                    "storage.s3 requires both access_key and secret_key when either is set",
                ));
            }
        };

        if let Some(endpoint) = &config.endpoint {
            let lower = endpoint.to_lowercase();
            let endpoint = if lower.starts_with("http://") || lower.starts_with("https://") {
                endpoint.clone()
            } else {
                format!("http://{endpoint}")
            };
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        info!(bucket = %config.bucket, region = %region, "Initialised S3 object storage");
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            prefix: config
                .prefix
                .as_ref()
                .map(|p| p.trim_end_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    fn full_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}/{key}"),
            None => key.to_string(),
        }
    }
}

/// Map an SDK error, turning HTTP 404 into `NotFound`.
fn map_sdk_error<E>(err: SdkError<E>, key: &str) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if let SdkError::ServiceError(ref service_err) = err
        && service_err.raw().status().as_u16() == 404
    {
        return AppError::not_found(format!("Object not found: {key}"));
    }
    AppError::with_source(
        ErrorKind::Storage,
        format!("S3 request failed for {key}"),
        err,
    )
}

fn presigning_config(expires_in: Duration) -> AppResult<PresigningConfig> {
    PresigningConfig::expires_in(expires_in).map_err(|e| {
        AppError::with_source(ErrorKind::Validation, "Invalid presigned URL lifetime", e)
    })
}

fn expiry(expires_in: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::from_std(expires_in).unwrap_or_else(|_| chrono::Duration::zero())
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn upload(&self, key: &str, data: Bytes, content_type: Option<&str>) -> AppResult<()> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .set_content_type(content_type.map(str::to_string))
            .body(S3ByteStream::from(data))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        debug!(key, bytes = size, "Stored object in S3");
        Ok(())
    }

    async fn download(&self, key: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        let data = output.body.collect().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to read {key}"), e)
        })?;
        Ok(data.into_bytes())
    }

    async fn download_stream(&self, key: &str) -> AppResult<ByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        let stream = ReaderStream::new(output.body.into_async_read());
        Ok(Box::pin(stream))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        // delete_object succeeds for missing keys, so check first.
        if !self.exists(key).await? {
            return Err(AppError::not_found(format!("Object not found: {key}")));
        }
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let encoded = utf8_percent_encode(&self.full_key(from), NON_ALPHANUMERIC).to_string();
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .key(self.full_key(to))
            .copy_source(format!("{}/{encoded}", self.bucket))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, from))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) => match map_sdk_error(err, key) {
                e if e.kind == ErrorKind::NotFound => Ok(false),
                e => Err(e),
            },
        }
    }

    async fn metadata(&self, key: &str) -> AppResult<StorageObjectMeta> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(StorageObjectMeta {
            key: key.to_string(),
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
            content_type: output.content_type().map(str::to_string),
            last_modified: output
                .last_modified()
                .and_then(|dt| DateTime::from_timestamp(dt.secs(), 0)),
        })
    }

    async fn presigned_upload_url(
        &self,
        key: &str,
        content_type: Option<&str>,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .set_content_type(content_type.map(str::to_string))
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(PresignedUrl {
            url: request.uri().to_string(),
            method: request.method().to_string(),
            expires_at: expiry(expires_in),
        })
    }

    async fn presigned_download_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> AppResult<PresignedUrl> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(self.full_key(key))
            .presigned(presigning_config(expires_in)?)
            .await
            .map_err(|e| map_sdk_error(e, key))?;
        Ok(PresignedUrl {
            url: request.uri().to_string(),
            method: request.method().to_string(),
            expires_at: expiry(expires_in),
        })
    }
}
