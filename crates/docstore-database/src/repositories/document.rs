//! Document repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use docstore_core::error::{AppError, ErrorKind, codes};
use docstore_core::result::AppResult;
use docstore_core::types::{PageRequest, PageResponse};
use docstore_entity::document::{
    CreateDocument, DeletedFolderInfo, Document, DocumentQuery, DocumentScope,
};

use super::{contains_pattern, db_err};
use crate::store::{DeletionFilter, DocumentStore};

/// Repository for document records.
#[derive(Debug, Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    /// Create a new document repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Document {id} not found")).with_code(codes::DOCUMENT_NOT_FOUND)
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Postgres>, owner_id: Uuid, query: &DocumentQuery) {
    qb.push(" WHERE owner_id = ");
    qb.push_bind(owner_id);
    qb.push(" AND is_deleted = ");
    qb.push_bind(query.deleted);
    match query.scope {
        DocumentScope::Any => {}
        DocumentScope::Root => {
            qb.push(" AND folder_id IS NULL");
        }
        DocumentScope::Folder(folder_id) => {
            qb.push(" AND folder_id = ");
            qb.push_bind(folder_id);
        }
    }
    if let Some(tag) = query.tag.clone() {
        qb.push(" AND ");
        qb.push_bind(tag);
        qb.push(" = ANY(tags)");
    }
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND lower(name) LIKE ");
        qb.push_bind(contains_pattern(search));
        qb.push(" ESCAPE '\\'");
    }
}

#[async_trait]
impl DocumentStore for PgDocumentRepository {
    async fn find_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Option<Document>> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE id = $1 AND owner_id = $2 \
             AND ($3::boolean IS NULL OR is_deleted = $3)",
        )
        .bind(id)
        .bind(owner_id)
        .bind(filter.as_flag())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find document"))
    }

    async fn list(
        &self,
        owner_id: Uuid,
        query: &DocumentQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM documents");
        push_list_filters(&mut count_qb, owner_id, query);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count documents"))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM documents");
        push_list_filters(&mut qb, owner_id, query);
        qb.push(" ORDER BY ");
        qb.push(query.sort_by.as_sql());
        qb.push(" ");
        qb.push(query.sort_direction.as_sql());
        qb.push(", id ASC LIMIT ");
        qb.push_bind(page.limit() as i64);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset() as i64);

        let documents = qb
            .build_query_as::<Document>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list documents"))?;

        Ok(PageResponse::new(
            documents,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn count_in_folders(
        &self,
        owner_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, u64>> {
        if folder_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            "SELECT folder_id, COUNT(*) FROM documents \
             WHERE owner_id = $1 AND folder_id = ANY($2) AND NOT is_deleted \
             GROUP BY folder_id",
        )
        .bind(owner_id)
        .bind(folder_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to count documents per folder"))?;

        Ok(rows
            .into_iter()
            .map(|(folder_id, count)| (folder_id, count as u64))
            .collect())
    }

    async fn insert(&self, data: &CreateDocument) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "INSERT INTO documents (id, owner_id, folder_id, name, original_name, mime_type, \
             size_bytes, extension, storage_key, tags, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(data.id)
        .bind(data.owner_id)
        .bind(data.folder_id)
        .bind(&data.name)
        .bind(&data.original_name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.extension)
        .bind(&data.storage_key)
        .bind(&data.tags)
        .bind(&data.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::conflict(format!("Document {} already exists", data.id))
                    .with_code(codes::DOCUMENT_EXISTS)
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create document", e),
        })
    }

    async fn update(&self, document: &Document) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET folder_id = $3, name = $4, tags = $5, metadata = $6, \
             version = $7, updated_at = NOW() WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(document.id)
        .bind(document.owner_id)
        .bind(document.folder_id)
        .bind(&document.name)
        .bind(&document.tags)
        .bind(&document.metadata)
        .bind(document.version)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update document"))?
        .ok_or_else(|| not_found(document.id))
    }

    async fn mark_deleted(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
        folder_info: Option<DeletedFolderInfo>,
    ) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET is_deleted = TRUE, deleted_at = $3, deleted_folder_info = $4, \
             updated_at = NOW() WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(at)
        .bind(folder_info.map(Json))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to soft-delete document"))?
        .ok_or_else(|| not_found(id))
    }

    async fn restore(
        &self,
        owner_id: Uuid,
        id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Document> {
        sqlx::query_as::<_, Document>(
            "UPDATE documents SET is_deleted = FALSE, deleted_at = NULL, \
             deleted_folder_info = NULL, folder_id = $3, updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .bind(folder_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to restore document"))?
        .ok_or_else(|| not_found(id))
    }

    async fn soft_delete_in_folders(
        &self,
        owner_id: Uuid,
        folders: &[DeletedFolderInfo],
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        if folders.is_empty() {
            return Ok(0);
        }
        let ids: Vec<Uuid> = folders.iter().map(|f| f.folder_id).collect();
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        let paths: Vec<&str> = folders.iter().map(|f| f.path.as_str()).collect();
        let parents: Vec<Option<Uuid>> = folders.iter().map(|f| f.parent_id).collect();

        let result = sqlx::query(
            "UPDATE documents d SET is_deleted = TRUE, deleted_at = $6, updated_at = NOW(), \
                 deleted_folder_info = jsonb_build_object( \
                     'folder_id', s.folder_id, 'name', s.name, \
                     'path', s.path, 'parent_id', s.parent_id) \
             FROM UNNEST($2::uuid[], $3::text[], $4::text[], $5::uuid[]) \
                 AS s(folder_id, name, path, parent_id) \
             WHERE d.owner_id = $1 AND d.folder_id = s.folder_id AND NOT d.is_deleted",
        )
        .bind(owner_id)
        .bind(&ids)
        .bind(&names)
        .bind(&paths)
        .bind(&parents)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to soft-delete folder documents"))?;
        Ok(result.rows_affected())
    }

    async fn detach_from_folders(&self, owner_id: Uuid, folder_ids: &[Uuid]) -> AppResult<u64> {
        if folder_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE documents SET folder_id = NULL, updated_at = NOW() \
             WHERE owner_id = $1 AND folder_id = ANY($2)",
        )
        .bind(owner_id)
        .bind(folder_ids)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to detach folder documents"))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete document"))?;
        Ok(result.rows_affected() > 0)
    }
}
