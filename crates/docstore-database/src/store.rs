//! Metadata store traits.
//!
//! Every method is scoped by `owner_id`; a record owned by someone else is
//! indistinguishable from a missing one.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use docstore_core::result::AppResult;
use docstore_core::traits::QuotaService;
use docstore_core::types::{PageRequest, PageResponse};
use docstore_entity::document::{CreateDocument, DeletedFolderInfo, Document, DocumentQuery};
use docstore_entity::folder::{CreateFolder, Folder, FolderQuery, FolderRelocation};
use docstore_entity::quota::StorageQuota;

/// Which deletion state a lookup accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionFilter {
    /// Only records that are not soft-deleted.
    Active,
    /// Only soft-deleted records.
    Deleted,
    /// Records in either state.
    Any,
}

impl DeletionFilter {
    /// Whether a record with the given flag passes this filter.
    pub fn matches(&self, is_deleted: bool) -> bool {
        match self {
            Self::Active => !is_deleted,
            Self::Deleted => is_deleted,
            Self::Any => true,
        }
    }

    /// Value to bind against `is_deleted`, or None for no constraint.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Active => Some(false),
            Self::Deleted => Some(true),
            Self::Any => None,
        }
    }
}

/// Persistence for folder records.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a folder by ID.
    async fn find_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Option<Folder>>;

    /// Find the active folder at an exact path.
    async fn find_by_path(&self, owner_id: Uuid, path: &str) -> AppResult<Option<Folder>>;

    /// Find an active sibling whose name matches case-insensitively.
    async fn find_sibling_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>>;

    /// All folders below `id` by parent links, sorted by depth then name.
    async fn find_descendants(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Vec<Folder>>;

    /// Deepest depth among the descendants of `id` in any state.
    async fn max_descendant_depth(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<i32>>;

    /// Every folder of the owner, sorted by depth then name.
    async fn find_all(&self, owner_id: Uuid, filter: DeletionFilter) -> AppResult<Vec<Folder>>;

    /// Page through active folders.
    async fn list(
        &self,
        owner_id: Uuid,
        query: &FolderQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>>;

    /// Number of active direct children.
    async fn count_children(&self, owner_id: Uuid, id: Uuid) -> AppResult<u64>;

    /// Insert a new folder.
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Apply a rename or move to a folder and rewrite its descendants.
    ///
    /// Descendants are found through parent links, so a trashed subtree that
    /// happens to share the old path is left alone.
    ///
    /// Returns the updated folder and the number of descendants rewritten.
    async fn relocate(&self, change: &FolderRelocation) -> AppResult<(Folder, u64)>;

    /// Soft-delete a folder and its active descendants.
    ///
    /// Returns the folder and every descendant as stored afterwards.
    async fn mark_deleted_subtree(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Folder>>;

    /// Clear the soft-delete marker on one folder.
    async fn restore(&self, owner_id: Uuid, id: Uuid) -> AppResult<Folder>;

    /// Hard-delete folders, returning how many were removed.
    async fn delete_many(&self, owner_id: Uuid, ids: &[Uuid]) -> AppResult<u64>;
}

/// Persistence for document records.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a document by ID.
    async fn find_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Option<Document>>;

    /// Page through documents.
    async fn list(
        &self,
        owner_id: Uuid,
        query: &DocumentQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Document>>;

    /// Active document counts keyed by folder ID. Folders with no documents
    /// are absent from the map.
    async fn count_in_folders(
        &self,
        owner_id: Uuid,
        folder_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, u64>>;

    /// Insert a new document.
    async fn insert(&self, data: &CreateDocument) -> AppResult<Document>;

    /// Persist the mutable fields (name, folder, tags, metadata, version).
    async fn update(&self, document: &Document) -> AppResult<Document>;

    /// Soft-delete one document, storing the folder snapshot if given.
    async fn mark_deleted(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
        folder_info: Option<DeletedFolderInfo>,
    ) -> AppResult<Document>;

    /// Clear the soft-delete marker and snapshot, attaching to `folder_id`.
    async fn restore(
        &self,
        owner_id: Uuid,
        id: Uuid,
        folder_id: Option<Uuid>,
    ) -> AppResult<Document>;

    /// Soft-delete the active documents inside the given folders, giving
    /// each the snapshot of the folder it sat in.
    async fn soft_delete_in_folders(
        &self,
        owner_id: Uuid,
        folders: &[DeletedFolderInfo],
        at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Move every document inside the given folders to the root level.
    async fn detach_from_folders(&self, owner_id: Uuid, folder_ids: &[Uuid]) -> AppResult<u64>;

    /// Hard-delete one document record.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> AppResult<bool>;
}

/// Per-owner quota rows.
#[async_trait]
pub trait QuotaStore: QuotaService {
    /// Current quota for an owner, created with the default total if absent.
    async fn get_quota(&self, owner_id: Uuid) -> AppResult<StorageQuota>;
}
