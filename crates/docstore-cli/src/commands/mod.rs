//! CLI command definitions and dispatch.

pub mod document;
pub mod folder;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use docstore_core::config::AppConfig;
use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_database::DatabasePool;
use docstore_database::repositories::{
    PgDocumentRepository, PgFolderRepository, PgQuotaRepository,
};
use docstore_service::{DocumentService, FolderService, RequestContext, TreeService};

use crate::output::OutputFormat;

/// DocStore: multi-tenant folder and document store administration
#[derive(Debug, Parser)]
#[command(name = "docstore", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Owner on whose behalf folder and document commands run
    #[arg(short, long, global = true)]
    pub owner: Option<Uuid>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Folder management
    Folder(folder::FolderArgs),
    /// Document management
    Document(document::DocumentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config, self.format).await,
            Commands::Folder(args) => {
                let engines = Engines::connect(config, self.require_owner()?).await?;
                folder::execute(args, &engines, self.format).await
            }
            Commands::Document(args) => {
                let engines = Engines::connect(config, self.require_owner()?).await?;
                document::execute(args, &engines, self.format).await
            }
        }
    }

    fn require_owner(&self) -> AppResult<Uuid> {
        self.owner
            .ok_or_else(|| AppError::validation("--owner <UUID> is required for this command"))
    }
}

/// The engines wired to PostgreSQL, the configured object storage and the
/// quota table, scoped to one owner.
pub struct Engines {
    /// Folder tree engine.
    pub folders: FolderService,
    /// Tree and breadcrumb queries.
    pub tree: TreeService,
    /// Document lifecycle engine.
    pub documents: DocumentService,
    /// Context every command runs in.
    pub ctx: RequestContext,
}

impl Engines {
    /// Connect to the stores named in the configuration.
    pub async fn connect(config: &AppConfig, owner_id: Uuid) -> AppResult<Self> {
        let db = DatabasePool::connect(&config.database).await?;
        let pool = db.pool().clone();

        let folder_store = Arc::new(PgFolderRepository::new(pool.clone()));
        let document_store = Arc::new(PgDocumentRepository::new(pool.clone()));
        let quota = Arc::new(PgQuotaRepository::new(
            pool,
            config.quota.default_quota_bytes,
        ));
        let storage = docstore_storage::build_storage(&config.storage).await?;

        Ok(Self {
            folders: FolderService::new(
                folder_store.clone(),
                document_store.clone(),
                config.folders.clone(),
            ),
            tree: TreeService::new(folder_store.clone(), document_store.clone()),
            documents: DocumentService::new(
                document_store,
                folder_store,
                storage,
                quota,
                config.storage.clone(),
                config.folders.clone(),
            ),
            ctx: RequestContext::new(owner_id),
        })
    }
}

/// Parse an optional folder argument, where `root` or `/` means the root level.
pub fn parse_folder_target(raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw {
        None | Some("root") | Some("/") => Ok(None),
        Some(id) => Uuid::parse_str(id)
            .map(Some)
            .map_err(|e| AppError::validation(format!("Invalid folder ID '{id}': {e}"))),
    }
}
