//! Construct the configured object storage provider.

use std::sync::Arc;

use tracing::info;

use docstore_core::config::StorageConfig;
use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::traits::ObjectStorage;

use crate::providers::LocalObjectStorage;

/// Build the provider named by `config.provider`.
pub async fn build_storage(config: &StorageConfig) -> AppResult<Arc<dyn ObjectStorage>> {
    let storage: Arc<dyn ObjectStorage> = match config.provider.as_str() {
        "local" => {
            if config.local.signing_secret.is_empty() {
                return Err(AppError::configuration(
                    "storage.local.signing_secret must be set",
                ));
            }
            Arc::new(
                LocalObjectStorage::new(
                    &config.local.root_path,
                    &config.local.public_base_url,
                    &config.local.signing_secret,
                )
                .await?,
            )
        }
        #[cfg(feature = "s3")]
        "s3" => Arc::new(crate::providers::S3ObjectStorage::new(&config.s3).await?),
        #[cfg(feature = "memory")]
        "memory" => Arc::new(crate::providers::MemoryObjectStorage::new()),
        other => {
            return Err(AppError::configuration(format!(
                "Unsupported storage provider '{other}'"
            )));
        }
    };

    info!(provider = storage.provider_type(), "Object storage ready");
    Ok(storage)
}
