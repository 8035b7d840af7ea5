//! Shared harness wiring the engines to in-memory collaborators.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use docstore_core::config::{FolderConfig, StorageConfig};
use docstore_database::memory::{MemoryDocumentStore, MemoryFolderStore, MemoryQuotaStore};
use docstore_database::store::{DeletionFilter, DocumentStore, FolderStore, QuotaStore};
use docstore_entity::document::Document;
use docstore_entity::folder::Folder;
use docstore_service::document::UploadDocumentRequest;
use docstore_service::folder::CreateFolderRequest;
use docstore_service::{DocumentService, FolderService, RequestContext, TreeService};
use docstore_storage::providers::MemoryObjectStorage;

/// Default quota granted to test owners.
pub const TEST_QUOTA_BYTES: i64 = 1024 * 1024;

/// Engines and their backing stores for one test.
pub struct TestEngines {
    pub folders: FolderService,
    pub tree: TreeService,
    pub documents: DocumentService,
    pub folder_store: Arc<MemoryFolderStore>,
    pub document_store: Arc<MemoryDocumentStore>,
    pub storage: Arc<MemoryObjectStorage>,
    pub quota: Arc<MemoryQuotaStore>,
    pub ctx: RequestContext,
}

impl TestEngines {
    /// Build engines with default limits.
    pub fn new() -> Self {
        Self::with_config(FolderConfig::default(), StorageConfig::default())
    }

    /// Build engines with custom limits.
    pub fn with_config(folder_config: FolderConfig, storage_config: StorageConfig) -> Self {
        let folder_store = Arc::new(MemoryFolderStore::new());
        let document_store = Arc::new(MemoryDocumentStore::new());
        let storage = Arc::new(MemoryObjectStorage::new());
        let quota = Arc::new(MemoryQuotaStore::new(TEST_QUOTA_BYTES));

        let folders = FolderService::new(
            folder_store.clone(),
            document_store.clone(),
            folder_config.clone(),
        );
        let tree = TreeService::new(folder_store.clone(), document_store.clone());
        let documents = DocumentService::new(
            document_store.clone(),
            folder_store.clone(),
            storage.clone(),
            quota.clone(),
            storage_config,
            folder_config,
        );

        Self {
            folders,
            tree,
            documents,
            folder_store,
            document_store,
            storage,
            quota,
            ctx: RequestContext::new(Uuid::new_v4()),
        }
    }

    /// Context for a different owner.
    pub fn other_owner(&self) -> RequestContext {
        RequestContext::new(Uuid::new_v4())
    }

    /// Create a folder, panicking on failure.
    pub async fn folder(&self, name: &str, parent: Option<&Folder>) -> Folder {
        self.folders
            .create_folder(
                &self.ctx,
                CreateFolderRequest {
                    name: name.to_string(),
                    parent_id: parent.map(|p| p.id),
                    metadata: None,
                },
            )
            .await
            .expect("Failed to create folder")
    }

    /// Upload a small document, panicking on failure.
    pub async fn document(&self, name: &str, folder: Option<&Folder>) -> Document {
        self.documents
            .upload(
                &self.ctx,
                UploadDocumentRequest {
                    name: name.to_string(),
                    folder_id: folder.map(|f| f.id),
                    data: Bytes::from_static(b"%PDF-1.7 test content"),
                    ..UploadDocumentRequest::default()
                },
            )
            .await
            .expect("Failed to upload document")
    }

    /// Reload a folder in any state.
    pub async fn reload_folder(&self, id: Uuid) -> Option<Folder> {
        self.folder_store
            .find_by_id(self.ctx.owner_id, id, DeletionFilter::Any)
            .await
            .expect("Folder lookup failed")
    }

    /// Reload a document in any state.
    pub async fn reload_document(&self, id: Uuid) -> Option<Document> {
        self.document_store
            .find_by_id(self.ctx.owner_id, id, DeletionFilter::Any)
            .await
            .expect("Document lookup failed")
    }

    /// Active folder at an exact path.
    pub async fn folder_at(&self, path: &str) -> Option<Folder> {
        self.folder_store
            .find_by_path(self.ctx.owner_id, path)
            .await
            .expect("Path lookup failed")
    }

    /// Bytes currently charged to the test owner.
    pub async fn used_bytes(&self) -> i64 {
        self.quota
            .get_quota(self.ctx.owner_id)
            .await
            .expect("Quota lookup failed")
            .used_bytes
    }

    /// Every folder of the test owner in any state.
    pub async fn all_folders(&self) -> Vec<Folder> {
        self.folder_store
            .find_all(self.ctx.owner_id, DeletionFilter::Any)
            .await
            .expect("Folder scan failed")
    }
}

/// Check the path and depth invariants across every folder.
pub fn assert_tree_consistent(folders: &[Folder]) {
    for folder in folders {
        match folder.parent_id {
            None => {
                assert_eq!(folder.depth, 0, "{}", folder.path);
                assert_eq!(folder.path, format!("/{}", folder.name));
            }
            Some(parent_id) => {
                let parent = folders
                    .iter()
                    .find(|f| f.id == parent_id)
                    .unwrap_or_else(|| panic!("Missing parent of {}", folder.path));
                assert_eq!(folder.depth, parent.depth + 1, "{}", folder.path);
                assert_eq!(folder.path, format!("{}/{}", parent.path, folder.name));
            }
        }
    }
}
