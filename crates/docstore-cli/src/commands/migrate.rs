//! Database migration management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use docstore_core::config::AppConfig;
use docstore_core::result::AppResult;
use docstore_database::DatabasePool;
use docstore_database::migration;

use crate::output::{self, OutputFormat};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Show applied migrations
    Status,
}

#[derive(Debug, Serialize, Tabled)]
struct MigrationRow {
    version: i64,
    description: String,
    installed_on: String,
    success: bool,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let db = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            migration::run_migrations(db.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Status => {
            let applied = migration::migration_status(db.pool()).await?;
            if applied.is_empty() {
                output::print_warning("No migrations have been applied.");
            }
            let rows: Vec<MigrationRow> = applied
                .into_iter()
                .map(|m| MigrationRow {
                    version: m.version,
                    description: m.description,
                    installed_on: m.installed_on.format("%Y-%m-%d %H:%M").to_string(),
                    success: m.success,
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
