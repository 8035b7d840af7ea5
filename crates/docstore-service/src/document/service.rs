//! Document CRUD, content transfer and quota accounting.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use docstore_core::config::{FolderConfig, StorageConfig};
use docstore_core::error::{AppError, ErrorKind, codes};
use docstore_core::result::AppResult;
use docstore_core::traits::{ObjectStorage, PresignedUrl, QuotaService};
use docstore_core::types::{PageRequest, PageResponse, SortDirection};
use docstore_database::store::{DeletionFilter, DocumentStore, FolderStore};
use docstore_entity::document::model::extension_of;
use docstore_entity::document::{
    CreateDocument, Document, DocumentQuery, DocumentScope, DocumentSortField,
};
use docstore_storage::mime::mime_or_default;

use crate::context::RequestContext;
use crate::validation;

/// Manages documents and their content in object storage.
#[derive(Debug, Clone)]
pub struct DocumentService {
    pub(super) documents: Arc<dyn DocumentStore>,
    pub(super) folders: Arc<dyn FolderStore>,
    storage: Arc<dyn ObjectStorage>,
    quota: Arc<dyn QuotaService>,
    storage_config: StorageConfig,
    pub(super) folder_config: FolderConfig,
}

/// Request to upload a new document.
#[derive(Debug, Clone, Default)]
pub struct UploadDocumentRequest {
    /// Document name including extension.
    pub name: String,
    /// Target folder (None for the root level).
    pub folder_id: Option<Uuid>,
    /// Content type; guessed from the name when absent.
    pub mime_type: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Arbitrary metadata; must be a JSON object when present.
    pub metadata: Option<serde_json::Value>,
    /// The content.
    pub data: Bytes,
}

/// Partial update of a document's descriptive fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocumentRequest {
    /// New name.
    pub name: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
    /// Replacement metadata.
    pub metadata: Option<serde_json::Value>,
}

/// A storage key reserved for a direct client upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    /// Key the client must upload to.
    pub storage_key: String,
    /// The presigned `PUT` URL.
    pub url: PresignedUrl,
}

/// Request to register content uploaded through a presigned URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterUploadRequest {
    /// Key returned by [`DocumentService::upload_url`].
    pub storage_key: String,
    /// Document name.
    pub name: String,
    /// Target folder (None for the root level).
    pub folder_id: Option<Uuid>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Arbitrary metadata.
    pub metadata: Option<serde_json::Value>,
}

pub(super) fn document_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Document {id} not found")).with_code(codes::DOCUMENT_NOT_FOUND)
}

fn storage_key(owner_id: Uuid, document_id: Uuid, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{owner_id}/{document_id}.{ext}"),
        None => format!("{owner_id}/{document_id}"),
    }
}

impl DocumentService {
    /// Creates a new document service.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        folders: Arc<dyn FolderStore>,
        storage: Arc<dyn ObjectStorage>,
        quota: Arc<dyn QuotaService>,
        storage_config: StorageConfig,
        folder_config: FolderConfig,
    ) -> Self {
        Self {
            documents,
            folders,
            storage,
            quota,
            storage_config,
            folder_config,
        }
    }

    pub(super) async fn load(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Document> {
        self.documents
            .find_by_id(ctx.owner_id, document_id, filter)
            .await?
            .ok_or_else(|| document_not_found(document_id))
    }

    /// Requires the target folder, when given, to be active and owned.
    async fn require_folder(&self, ctx: &RequestContext, folder_id: Option<Uuid>) -> AppResult<()> {
        let Some(folder_id) = folder_id else {
            return Ok(());
        };
        self.folders
            .find_by_id(ctx.owner_id, folder_id, DeletionFilter::Active)
            .await?
            .map(|_| ())
            .ok_or_else(|| {
                AppError::not_found(format!("Folder {folder_id} not found"))
                    .with_code(codes::FOLDER_NOT_FOUND)
            })
    }

    async fn require_quota(&self, ctx: &RequestContext, bytes: i64) -> AppResult<()> {
        if !self.quota.has_available(ctx.owner_id, bytes).await? {
            return Err(AppError::validation(format!(
                "Storing {bytes} more bytes would exceed the storage quota"
            ))
            .with_code(codes::QUOTA_EXCEEDED));
        }
        Ok(())
    }

    fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.storage_config.presign_expiry_seconds)
    }

    /// Inserts a record for content already in storage, removing the object
    /// again if the insert fails. A conflicting insert leaves the object to
    /// the record that already owns it.
    async fn insert_stored(&self, data: CreateDocument) -> AppResult<Document> {
        match self.documents.insert(&data).await {
            Ok(document) => Ok(document),
            Err(e) if e.kind == ErrorKind::Conflict => Err(e),
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&data.storage_key).await {
                    warn!(
                        storage_key = %data.storage_key,
                        error = %cleanup,
                        "Failed to remove orphaned object"
                    );
                }
                Err(e)
            }
        }
    }

    /// Uploads a new document.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        req: UploadDocumentRequest,
    ) -> AppResult<Document> {
        let name = validation::document_name(&req.name, self.folder_config.max_name_length)?;
        let metadata = validation::metadata_object(req.metadata)?;
        let size = req.data.len() as u64;
        if size > self.storage_config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "Upload of {size} bytes exceeds the {} byte limit",
                self.storage_config.max_upload_size_bytes
            ))
            .with_code(codes::UPLOAD_TOO_LARGE));
        }
        let size = size as i64;

        self.require_folder(ctx, req.folder_id).await?;
        self.require_quota(ctx, size).await?;

        let id = Uuid::now_v7();
        let extension = extension_of(&name);
        let key = storage_key(ctx.owner_id, id, extension.as_deref());
        let mime_type = req
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| mime_or_default(&name).to_string());

        self.storage.upload(&key, req.data, Some(&mime_type)).await?;

        let document = self
            .insert_stored(CreateDocument {
                id,
                owner_id: ctx.owner_id,
                folder_id: req.folder_id,
                name: name.clone(),
                original_name: name,
                mime_type,
                size_bytes: size,
                extension,
                storage_key: key,
                tags: validation::normalize_tags(req.tags),
                metadata,
            })
            .await?;
        self.quota.adjust_used(ctx.owner_id, size).await?;

        info!(
            owner_id = %ctx.owner_id,
            document_id = %document.id,
            folder_id = ?document.folder_id,
            size_bytes = size,
            "Document uploaded"
        );
        Ok(document)
    }

    /// Reserves a storage key and returns a presigned URL to upload to it.
    pub async fn upload_url(
        &self,
        ctx: &RequestContext,
        name: &str,
        content_type: Option<&str>,
    ) -> AppResult<PresignedUpload> {
        let name = validation::document_name(name, self.folder_config.max_name_length)?;
        let extension = extension_of(&name);
        let key = storage_key(ctx.owner_id, Uuid::now_v7(), extension.as_deref());
        let content_type = content_type.unwrap_or_else(|| mime_or_default(&name));
        let url = self
            .storage
            .presigned_upload_url(&key, Some(content_type), self.presign_expiry())
            .await?;
        Ok(PresignedUpload {
            storage_key: key,
            url,
        })
    }

    /// Creates the document record for content uploaded via [`Self::upload_url`].
    pub async fn register_upload(
        &self,
        ctx: &RequestContext,
        req: RegisterUploadRequest,
    ) -> AppResult<Document> {
        let name = validation::document_name(&req.name, self.folder_config.max_name_length)?;
        let metadata = validation::metadata_object(req.metadata)?;

        // Keys are "{owner}/{uuid}[.ext]".
        let id = req
            .storage_key
            .strip_prefix(&format!("{}/", ctx.owner_id))
            .map(|rest| rest.split('.').next().unwrap_or(rest))
            .and_then(|stem| Uuid::parse_str(stem).ok())
            .ok_or_else(|| AppError::validation("Storage key does not belong to this owner"))?;

        if self
            .documents
            .find_by_id(ctx.owner_id, id, DeletionFilter::Any)
            .await?
            .is_some()
        {
            return Err(
                AppError::conflict(format!("Upload {} is already registered", req.storage_key))
                    .with_code(codes::DOCUMENT_EXISTS),
            );
        }

        let object = self.storage.metadata(&req.storage_key).await?;
        if object.size_bytes > self.storage_config.max_upload_size_bytes {
            self.storage.delete(&req.storage_key).await?;
            return Err(AppError::validation(format!(
                "Upload of {} bytes exceeds the {} byte limit",
                object.size_bytes, self.storage_config.max_upload_size_bytes
            ))
            .with_code(codes::UPLOAD_TOO_LARGE));
        }
        let size = object.size_bytes as i64;

        self.require_folder(ctx, req.folder_id).await?;
        self.require_quota(ctx, size).await?;

        let document = self
            .insert_stored(CreateDocument {
                id,
                owner_id: ctx.owner_id,
                folder_id: req.folder_id,
                name: name.clone(),
                original_name: name.clone(),
                mime_type: object
                    .content_type
                    .unwrap_or_else(|| mime_or_default(&name).to_string()),
                size_bytes: size,
                extension: extension_of(&name),
                storage_key: req.storage_key,
                tags: validation::normalize_tags(req.tags),
                metadata,
            })
            .await?;
        self.quota.adjust_used(ctx.owner_id, size).await?;

        info!(
            owner_id = %ctx.owner_id,
            document_id = %document.id,
            size_bytes = size,
            "Presigned upload registered"
        );
        Ok(document)
    }

    /// Gets an active document.
    pub async fn get_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Document> {
        self.load(ctx, document_id, DeletionFilter::Active).await
    }

    /// Lists documents matching a query.
    pub async fn list_documents(
        &self,
        ctx: &RequestContext,
        query: &DocumentQuery,
        page: PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        self.documents.list(ctx.owner_id, query, &page).await
    }

    /// Lists soft-deleted documents, most recently changed first.
    pub async fn list_trash(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let query = DocumentQuery {
            scope: DocumentScope::Any,
            deleted: true,
            sort_by: DocumentSortField::UpdatedAt,
            sort_direction: SortDirection::Desc,
            ..DocumentQuery::default()
        };
        self.documents.list(ctx.owner_id, &query, &page).await
    }

    /// Updates name, tags or metadata, bumping the version.
    pub async fn update_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        req: UpdateDocumentRequest,
    ) -> AppResult<Document> {
        let mut document = self.load(ctx, document_id, DeletionFilter::Active).await?;
        if let Some(name) = req.name {
            document.name = validation::document_name(&name, self.folder_config.max_name_length)?;
        }
        if let Some(tags) = req.tags {
            document.tags = validation::normalize_tags(tags);
        }
        if req.metadata.is_some() {
            document.metadata = validation::metadata_object(req.metadata)?;
        }
        document.version += 1;

        let updated = self.documents.update(&document).await?;
        info!(
            owner_id = %ctx.owner_id,
            document_id = %document_id,
            version = updated.version,
            "Document updated"
        );
        Ok(updated)
    }

    /// Moves a document into an active folder (None for the root level).
    pub async fn move_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Document> {
        let mut document = self.load(ctx, document_id, DeletionFilter::Active).await?;
        if document.folder_id == folder_id {
            return Ok(document);
        }
        self.require_folder(ctx, folder_id).await?;

        document.folder_id = folder_id;
        let moved = self.documents.update(&document).await?;
        info!(
            owner_id = %ctx.owner_id,
            document_id = %document_id,
            folder_id = ?folder_id,
            "Document moved"
        );
        Ok(moved)
    }

    /// Copies a document's content and record into a folder (None for root).
    pub async fn copy_document(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Document> {
        let source = self.load(ctx, document_id, DeletionFilter::Active).await?;
        self.require_folder(ctx, folder_id).await?;
        self.require_quota(ctx, source.size_bytes).await?;

        let id = Uuid::now_v7();
        let key = storage_key(ctx.owner_id, id, source.extension.as_deref());
        self.storage.copy(&source.storage_key, &key).await?;

        let copy = self
            .insert_stored(CreateDocument {
                id,
                owner_id: ctx.owner_id,
                folder_id,
                name: source.name,
                original_name: source.original_name,
                mime_type: source.mime_type,
                size_bytes: source.size_bytes,
                extension: source.extension,
                storage_key: key,
                tags: source.tags,
                metadata: source.metadata,
            })
            .await?;
        self.quota.adjust_used(ctx.owner_id, copy.size_bytes).await?;

        info!(
            owner_id = %ctx.owner_id,
            source_id = %document_id,
            document_id = %copy.id,
            "Document copied"
        );
        Ok(copy)
    }

    /// Reads the content of an active document.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<(Document, Bytes)> {
        let document = self.load(ctx, document_id, DeletionFilter::Active).await?;
        let data = self.storage.download(&document.storage_key).await?;
        Ok((document, data))
    }

    /// Creates a presigned download URL for an active document.
    pub async fn download_url(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<PresignedUrl> {
        let document = self.load(ctx, document_id, DeletionFilter::Active).await?;
        self.storage
            .presigned_download_url(&document.storage_key, self.presign_expiry())
            .await
    }

    /// Permanently deletes a document in any state and releases its quota.
    pub async fn permanent_delete(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
    ) -> AppResult<Document> {
        let document = self.load(ctx, document_id, DeletionFilter::Any).await?;

        match self.storage.delete(&document.storage_key).await {
            Ok(()) => {}
            Err(e) if e.kind == ErrorKind::NotFound => {
                warn!(
                    document_id = %document_id,
                    storage_key = %document.storage_key,
                    "Stored object already missing"
                );
            }
            Err(e) => return Err(e),
        }

        if !self.documents.delete(ctx.owner_id, document_id).await? {
            return Err(document_not_found(document_id));
        }
        self.quota
            .adjust_used(ctx.owner_id, -document.size_bytes)
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            document_id = %document_id,
            size_bytes = document.size_bytes,
            "Document permanently deleted"
        );
        Ok(document)
    }
}
