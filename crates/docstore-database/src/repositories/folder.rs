//! Folder repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use docstore_core::error::{AppError, ErrorKind, codes};
use docstore_core::result::AppResult;
use docstore_core::types::{PageRequest, PageResponse};
use docstore_entity::folder::{CreateFolder, Folder, FolderQuery, FolderRelocation, FolderScope};

use super::{contains_pattern, db_err, escape_like};
use crate::store::{DeletionFilter, FolderStore};

/// Unique index enforcing case-insensitive sibling names among active folders.
const SIBLING_NAME_INDEX: &str = "folders_active_sibling_name_key";

/// Binds `$1` = owner, `$2` = folder; yields `subtree(id)` with every
/// descendant reached through `parent_id`, excluding the folder itself.
const SUBTREE_CTE: &str = "WITH RECURSIVE subtree AS ( \
        SELECT id FROM folders WHERE owner_id = $1 AND parent_id = $2 \
        UNION \
        SELECT f.id FROM folders f JOIN subtree s ON f.parent_id = s.id \
        WHERE f.owner_id = $1) ";

/// Repository for folder CRUD and subtree queries.
#[derive(Debug, Clone)]
pub struct PgFolderRepository {
    pool: PgPool,
}

impl PgFolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning sibling-name violations into a conflict.
fn write_err(conflict: String, context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(SIBLING_NAME_INDEX) => {
            AppError::conflict(conflict).with_code(codes::FOLDER_NAME_EXISTS)
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

fn sibling_conflict(name: &str) -> String {
    format!("A folder named '{name}' already exists here")
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid, query: &FolderQuery) {
    qb.push(" WHERE owner_id = ");
    qb.push_bind(owner_id);
    qb.push(" AND NOT is_deleted");
    match query.scope {
        FolderScope::All => {}
        FolderScope::Root => {
            qb.push(" AND parent_id IS NULL");
        }
        FolderScope::Children(parent_id) => {
            qb.push(" AND parent_id = ");
            qb.push_bind(parent_id);
        }
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND lower(name) LIKE ");
        qb.push_bind(contains_pattern(search));
        qb.push(" ESCAPE '\\'");
    }
}

#[async_trait]
impl FolderStore for PgFolderRepository {
    async fn find_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE id = $1 AND owner_id = $2 \
             AND ($3::boolean IS NULL OR is_deleted = $3)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(filter.as_flag())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find folder"))
    }

    async fn find_by_path(&self, owner_id: Uuid, path: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND path = $2 AND NOT is_deleted \
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(owner_id)
        .bind(path)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find folder by path"))
    }

    async fn find_sibling_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 AND parent_id IS NOT DISTINCT FROM $2 \
             AND lower(name) = lower($3) AND NOT is_deleted \
             AND ($4::uuid IS NULL OR id <> $4) LIMIT 1",
        )
        .bind(owner_id)
        .bind(parent_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to check sibling names"))
    }

    async fn find_descendants(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(&format!(
            "{SUBTREE_CTE}SELECT * FROM folders WHERE id IN (SELECT id FROM subtree) \
             AND ($3::boolean IS NULL OR is_deleted = $3) \
             ORDER BY depth ASC, lower(name) ASC"
        ))
        .bind(owner_id)
        .bind(id)
        .bind(filter.as_flag())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list descendants"))
    }

    async fn max_descendant_depth(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<i32>> {
        sqlx::query_scalar::<_, Option<i32>>(&format!(
            "{SUBTREE_CTE}SELECT MAX(depth) FROM folders WHERE id IN (SELECT id FROM subtree)"
        ))
        .bind(owner_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to compute subtree depth"))
    }

    async fn find_all(&self, owner_id: Uuid, filter: DeletionFilter) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE owner_id = $1 \
             AND ($2::boolean IS NULL OR is_deleted = $2) \
             ORDER BY depth ASC, lower(name) ASC",
        )
        .bind(owner_id)
        .bind(filter.as_flag())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list folders"))
    }

    async fn list(
        &self,
        owner_id: Uuid,
        query: &FolderQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM folders");
        push_list_filters(&mut count_qb, owner_id, query);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count folders"))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM folders");
        push_list_filters(&mut qb, owner_id, query);
        qb.push(" ORDER BY ");
        qb.push(query.sort_by.as_sql());
        qb.push(" ");
        qb.push(query.sort_direction.as_sql());
        qb.push(", id ASC LIMIT ");
        qb.push_bind(page.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let folders = qb
            .build_query_as::<Folder>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list folders"))?;

        Ok(PageResponse::new(
            folders,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_children(&self, owner_id: Uuid, id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM folders WHERE owner_id = $1 AND parent_id = $2 AND NOT is_deleted",
        )
        .bind(owner_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count children"))?;
        Ok(count as u64)
    }

    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders (owner_id, parent_id, name, path, depth, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(data.parent_id)
        .bind(&data.name)
        .bind(&data.path)
        .bind(data.depth)
        .bind(&data.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(write_err(sibling_conflict(&data.name), "Failed to create folder"))
    }

    async fn relocate(&self, change: &FolderRelocation) -> AppResult<(Folder, u64)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        let folder = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET name = $3, parent_id = $4, path = $5, depth = $6, \
             updated_at = NOW() WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(change.folder_id)
        .bind(change.owner_id)
        .bind(&change.name)
        .bind(change.parent_id)
        .bind(&change.new_path)
        .bind(change.new_depth)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_err(sibling_conflict(&change.name), "Failed to update folder"))?
        .ok_or_else(|| {
            AppError::not_found(format!("Folder {} not found", change.folder_id))
                .with_code(codes::FOLDER_NOT_FOUND)
        })?;

        // substr() is 1-based and counts characters, not bytes.
        let suffix_start = change.old_path.chars().count() as i32 + 1;
        let result = sqlx::query(&format!(
            "{SUBTREE_CTE}UPDATE folders SET path = $3 || substr(path, $4), \
             depth = depth + $5, updated_at = NOW() \
             WHERE id IN (SELECT id FROM subtree) AND path LIKE $6 ESCAPE '\\'"
        ))
        .bind(change.owner_id)
        .bind(change.folder_id)
        .bind(&change.new_path)
        .bind(suffix_start)
        .bind(change.depth_delta)
        .bind(format!("{}/%", escape_like(&change.old_path)))
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to rewrite descendant paths"))?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit folder relocation"))?;

        debug!(
            folder_id = %change.folder_id,
            descendants = result.rows_affected(),
            "Relocated folder subtree"
        );
        Ok((folder, result.rows_affected()))
    }

    async fn mark_deleted_subtree(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Folder>> {
        sqlx::query(&format!(
            "{SUBTREE_CTE}UPDATE folders SET is_deleted = TRUE, deleted_at = $3, \
             updated_at = NOW() WHERE owner_id = $1 \
             AND (id = $2 OR id IN (SELECT id FROM subtree)) AND NOT is_deleted"
        ))
        .bind(owner_id)
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to soft-delete folders"))?;

        sqlx::query_as::<_, Folder>(&format!(
            "{SUBTREE_CTE}SELECT * FROM folders WHERE owner_id = $1 \
             AND (id = $2 OR id IN (SELECT id FROM subtree)) \
             ORDER BY depth, lower(name)"
        ))
        .bind(owner_id)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to collect subtree"))
    }

    async fn restore(&self, owner_id: Uuid, id: Uuid) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "UPDATE folders SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_err(
            "An active sibling folder now uses this name".to_string(),
            "Failed to restore folder",
        ))?
        .ok_or_else(|| {
            AppError::not_found(format!("Folder {id} not found")).with_code(codes::FOLDER_NOT_FOUND)
        })
    }

    async fn delete_many(&self, owner_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM folders WHERE owner_id = $1 AND id = ANY($2)")
            .bind(owner_id)
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete folders"))?;
        Ok(result.rows_affected())
    }
}
