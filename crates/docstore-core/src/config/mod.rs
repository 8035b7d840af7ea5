//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section has defaults so a missing file still yields a
//! usable development configuration.

pub mod database;
pub mod folder;
pub mod logging;
pub mod quota;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::folder::FolderConfig;
pub use self::logging::LoggingConfig;
pub use self::quota::QuotaConfig;
pub use self::storage::{LocalStorageConfig, S3StorageConfig, StorageConfig};

use crate::error::AppError;

/// Environment variable selecting the overlay file (`config/{env}.toml`).
const ENV_VAR: &str = "DOCSTORE_ENV";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (base file + environment overlay + env vars).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Object storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Folder tree limits.
    #[serde(default)]
    pub folders: FolderConfig,
    /// Per-owner quota defaults.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the given base file with an environment-specific overlay
    /// (`config/{DOCSTORE_ENV}.toml`) and environment variables prefixed
    /// with `DOCSTORE__`, e.g. `DOCSTORE__DATABASE__URL`.
    pub fn load(config_path: &str) -> Result<Self, AppError> {
        let env = std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCSTORE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
