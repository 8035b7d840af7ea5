use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use docstore_core::error::{AppError, codes};
use docstore_core::result::AppResult;
use docstore_core::types::{PageRequest, PageResponse};
use docstore_entity::document::{
    CreateDocument, DeletedFolderInfo, Document, DocumentQuery, DocumentScope, DocumentSortField,
};

use crate::store::{DeletionFilter, DocumentStore};

/// In-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Document {id} not found")).with_code(codes::DOCUMENT_NOT_FOUND)
}

fn owned_mut(
    documents: &mut HashMap<Uuid, Document>,
    owner_id: Uuid,
    id: Uuid,
) -> AppResult<&mut Document> {
    documents
        .get_mut(&id)
        .filter(|d| d.owner_id == owner_id)
        .ok_or_else(|| not_found(id))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents
            .get(&id)
            .filter(|d| d.owner_id == owner_id && filter.matches(d.is_deleted))
            .cloned())
    }

    async fn list(
        &self,
        owner_id: Uuid,
        query: &DocumentQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>> {
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let documents = self.documents.read().await;
        let mut found: Vec<Document> = documents
            .values()
            .filter(|d| d.owner_id == owner_id && d.is_deleted == query.deleted)
            .filter(|d| match query.scope {
                DocumentScope::Any => true,
                DocumentScope::Root => d.folder_id.is_none(),
                DocumentScope::Folder(folder_id) => d.folder_id == Some(folder_id),
            })
            .filter(|d| query.tag.as_deref().is_none_or(|t| d.has_tag(t)))
            .filter(|d| {
                search
                    .as_deref()
                    .is_none_or(|s| d.name.to_lowercase().contains(s))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            let ordering = match query.sort_by {
                DocumentSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                DocumentSortField::Size => a.size_bytes.cmp(&b.size_bytes),
                DocumentSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                DocumentSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            query
                .sort_direction
                .apply(ordering)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.paginate(found))
    }

    async fn count_in_folders(
        &self,
        owner_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, u64>> {
        let documents = self.documents.read().await;
        let mut counts = HashMap::new();
        for doc in documents.values() {
            if doc.owner_id != owner_id || doc.is_deleted {
                continue;
            }
            if let Some(folder_id) = doc.folder_id.filter(|id| folder_ids.contains(id)) {
                *counts.entry(folder_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn insert(&self, data: &CreateDocument) -> AppResult<Document> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&data.id)
            || documents.values().any(|d| d.storage_key == data.storage_key)
        {
            return Err(
                AppError::conflict(format!("Document {} already exists", data.id))
                    .with_code(codes::DOCUMENT_EXISTS),
            );
        }

        let now = Utc::now();
        let document = Document {
            id: data.id,
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            original_name: data.original_name.clone(),
            mime_type: data.mime_type.clone(),
            size_bytes: data.size_bytes,
            extension: data.extension.clone(),
            storage_key: data.storage_key.clone(),
            tags: data.tags.clone(),
            metadata: data.metadata.clone(),
            version: 1,
            is_deleted: false,
            deleted_at: None,
            deleted_folder_info: None,
            created_at: now,
            updated_at: now,
        };
        documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn update(&self, document: &Document) -> AppResult<Document> {
        let mut documents = self.documents.write().await;
        let stored = owned_mut(&mut documents, document.owner_id, document.id)?;
        stored.folder_id = document.folder_id;
        stored.name = document.name.clone();
        stored.tags = document.tags.clone();
        stored.metadata = document.metadata.clone();
        stored.version = document.version;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn mark_deleted(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
        folder_info: Option<DeletedFolderInfo>,
    ) -> AppResult<Document> {
        let mut documents = self.documents.write().await;
        let doc = owned_mut(&mut documents, owner_id, id)?;
        doc.is_deleted = true;
        doc.deleted_at = Some(at);
        doc.deleted_folder_info = folder_info;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn restore(
        &self,
        owner_id: Uuid,
        id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Document> {
        let mut documents = self.documents.write().await;
        let doc = owned_mut(&mut documents, owner_id, id)?;
        doc.is_deleted = false;
        doc.deleted_at = None;
        doc.deleted_folder_info = None;
        doc.folder_id = folder_id;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn soft_delete_in_folders(
        &self,
        owner_id: Uuid,
        folders: &[DeletedFolderInfo],
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut documents = self.documents.write().await;
        let mut affected = 0;
        for doc in documents.values_mut() {
            if doc.owner_id != owner_id || doc.is_deleted {
                continue;
            }
            let snapshot = doc
                .folder_id
                .and_then(|id| folders.iter().find(|f| f.folder_id == id));
            if let Some(snapshot) = snapshot {
                doc.is_deleted = true;
                doc.deleted_at = Some(at);
                doc.deleted_folder_info = Some(snapshot.clone());
                doc.updated_at = Utc::now();
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn detach_from_folders(&self, owner_id: Uuid, folder_ids: &[Uuid]) -> AppResult<u64> {
        let mut documents = self.documents.write().await;
        let mut affected = 0;
        for doc in documents.values_mut() {
            let inside = doc.folder_id.is_some_and(|id| folder_ids.contains(&id));
            if doc.owner_id == owner_id && inside {
                doc.folder_id = None;
                doc.updated_at = Utc::now();
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut documents = self.documents.write().await;
        if documents.get(&id).is_some_and(|d| d.owner_id == owner_id) {
            documents.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }
}
