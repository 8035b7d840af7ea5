//! Database migration runner.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;

use docstore_core::error::{AppError, ErrorKind};

/// A migration recorded in the `_sqlx_migrations` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AppliedMigration {
    /// Migration version (timestamp prefix of the file name).
    pub version: i64,
    /// Description taken from the file name.
    pub description: String,
    /// When it was applied.
    pub installed_on: DateTime<Utc>,
    /// Whether it completed.
    pub success: bool,
}

/// Run all pending database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations applied");
    Ok(())
}

/// List applied migrations, oldest first.
///
/// Returns an empty list when migrations have never run.
pub async fn migration_status(pool: &PgPool) -> Result<Vec<AppliedMigration>, AppError> {
    let table: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations')::text")
            .fetch_one(pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to inspect migrations", e)
            })?;
    if table.is_none() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, AppliedMigration>(
        "SELECT version, description, installed_on, success \
         FROM _sqlx_migrations ORDER BY version",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read migrations", e))
}
