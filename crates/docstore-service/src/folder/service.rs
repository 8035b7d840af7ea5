//! Folder CRUD and subtree cascades.
//!
//! Paths and depths are derived here and nowhere else. Rename and move
//! update the folder itself and rewrite every descendant in a single store
//! call; soft-delete and purge cascade to the documents inside the subtree.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use docstore_core::config::FolderConfig;
use docstore_core::error::{AppError, codes};
use docstore_core::result::AppResult;
use docstore_core::types::{PageRequest, PageResponse};
use docstore_database::store::{DeletionFilter, DocumentStore, FolderStore};
use docstore_entity::document::DeletedFolderInfo;
use docstore_entity::folder::path::{child_path, is_descendant_path, renamed_path};
use docstore_entity::folder::{
    CreateFolder, Folder, FolderQuery, FolderRelocation, FolderScope, FolderWithCounts,
};

use crate::context::RequestContext;
use crate::validation;

/// Manages folder CRUD operations and subtree cascades.
#[derive(Debug, Clone)]
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
    documents: Arc<dyn DocumentStore>,
    config: FolderConfig,
}

/// Request to create a new folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root-level).
    pub parent_id: Option<Uuid>,
    /// Arbitrary metadata; must be a JSON object when present.
    pub metadata: Option<serde_json::Value>,
}

/// Result of soft-deleting a folder subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftDeleteSummary {
    /// Folders in the subtree, including the folder itself.
    pub folders: u64,
    /// Documents newly marked deleted.
    pub documents: u64,
}

/// Result of permanently deleting a folder subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentDeleteSummary {
    /// Folder records removed.
    pub folders_removed: u64,
    /// Documents moved to the root level.
    pub documents_detached: u64,
}

fn folder_not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Folder {id} not found")).with_code(codes::FOLDER_NOT_FOUND)
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        documents: Arc<dyn DocumentStore>,
        config: FolderConfig,
    ) -> Self {
        Self {
            folders,
            documents,
            config,
        }
    }

    /// Loads a folder owned by the caller in the given deletion state.
    async fn load(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Folder> {
        self.folders
            .find_by_id(ctx.owner_id, folder_id, filter)
            .await?
            .ok_or_else(|| folder_not_found(folder_id))
    }

    fn check_depth(&self, depth: i32) -> AppResult<()> {
        if depth >= self.config.max_depth {
            return Err(AppError::validation(format!(
                "Folder depth {depth} exceeds the limit of {} levels",
                self.config.max_depth
            ))
            .with_code(codes::FOLDER_MAX_DEPTH_EXCEEDED));
        }
        Ok(())
    }

    async fn ensure_unique_name(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<()> {
        let existing = self
            .folders
            .find_sibling_by_name(ctx.owner_id, parent_id, name, exclude_id)
            .await?;
        if existing.is_some() {
            return Err(
                AppError::conflict(format!("A folder named '{name}' already exists here"))
                    .with_code(codes::FOLDER_NAME_EXISTS),
            );
        }
        Ok(())
    }

    /// Creates a new folder as a leaf under `parent_id` (or at the root).
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Folder> {
        let name = validation::folder_name(&req.name, self.config.max_name_length)?;
        let metadata = validation::metadata_object(req.metadata)?;

        let (path, depth) = match req.parent_id {
            Some(parent_id) => {
                let parent = self.load(ctx, parent_id, DeletionFilter::Active).await?;
                let depth = parent.depth + 1;
                self.check_depth(depth)?;
                (child_path(Some(&parent.path), &name), depth)
            }
            None => (child_path(None, &name), 0),
        };

        self.ensure_unique_name(ctx, req.parent_id, &name, None)
            .await?;

        let folder = self
            .folders
            .insert(&CreateFolder {
                owner_id: ctx.owner_id,
                parent_id: req.parent_id,
                name,
                path,
                depth,
                metadata,
            })
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            path = %folder.path,
            "Folder created"
        );
        Ok(folder)
    }

    /// Gets an active folder by ID.
    pub async fn get_folder(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        self.load(ctx, folder_id, DeletionFilter::Active).await
    }

    /// Gets an active folder with its direct subfolder and document counts.
    pub async fn get_folder_with_counts(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<FolderWithCounts> {
        let folder = self.load(ctx, folder_id, DeletionFilter::Active).await?;
        let subfolder_count = self
            .folders
            .count_children(ctx.owner_id, folder_id)
            .await?;
        let document_count = self
            .documents
            .count_in_folders(ctx.owner_id, &[folder_id])
            .await?
            .get(&folder_id)
            .copied()
            .unwrap_or(0);

        Ok(FolderWithCounts {
            folder,
            subfolder_count,
            document_count,
        })
    }

    /// Lists active folders matching a query.
    pub async fn list_folders(
        &self,
        ctx: &RequestContext,
        query: &FolderQuery,
        page: PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        if let FolderScope::Children(parent_id) = query.scope {
            self.load(ctx, parent_id, DeletionFilter::Active).await?;
        }
        self.folders.list(ctx.owner_id, query, &page).await
    }

    /// Lists active root-level folders sorted by name.
    pub async fn get_root_folders(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let query = FolderQuery {
            scope: FolderScope::Root,
            ..FolderQuery::default()
        };
        self.folders.list(ctx.owner_id, &query, &page).await
    }

    /// Lists the active direct children of an active folder, sorted by name.
    pub async fn get_subfolders(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let query = FolderQuery {
            scope: FolderScope::Children(folder_id),
            ..FolderQuery::default()
        };
        self.list_folders(ctx, &query, page).await
    }

    /// Lists soft-deleted folders, most recently deleted first.
    pub async fn list_trash_folders(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let mut trashed = self
            .folders
            .find_all(ctx.owner_id, DeletionFilter::Deleted)
            .await?;
        trashed.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at).then(a.path.cmp(&b.path)));
        Ok(page.paginate(trashed))
    }

    /// Renames a folder and rewrites the paths of its descendants.
    ///
    /// Descendant depths are unchanged.
    pub async fn rename_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_name: &str,
    ) -> AppResult<Folder> {
        let folder = self.load(ctx, folder_id, DeletionFilter::Active).await?;
        let name = validation::folder_name(new_name, self.config.max_name_length)?;
        if name == folder.name {
            return Ok(folder);
        }

        self.ensure_unique_name(ctx, folder.parent_id, &name, Some(folder.id))
            .await?;

        let new_path = renamed_path(&folder.path, &name);
        let (renamed, descendants) = self
            .folders
            .relocate(&FolderRelocation {
                owner_id: ctx.owner_id,
                folder_id,
                old_path: folder.path.clone(),
                name,
                parent_id: folder.parent_id,
                new_path,
                new_depth: folder.depth,
                depth_delta: 0,
            })
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            old_path = %folder.path,
            new_path = %renamed.path,
            descendants,
            "Folder renamed"
        );
        Ok(renamed)
    }

    /// Moves a folder under a new parent (None for the root level).
    ///
    /// Rejects moves into the folder's own subtree and moves that would push
    /// any descendant past the depth limit.
    pub async fn move_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> AppResult<Folder> {
        let folder = self.load(ctx, folder_id, DeletionFilter::Active).await?;
        if new_parent_id == folder.parent_id {
            return Ok(folder);
        }

        let (parent_path, new_depth) = match new_parent_id {
            Some(target_id) => {
                let into_self = || {
                    AppError::validation("Cannot move a folder into itself or its descendants")
                        .with_code(codes::FOLDER_MOVE_INTO_SELF)
                };
                if target_id == folder.id {
                    return Err(into_self());
                }
                let target = self
                    .folders
                    .find_by_id(ctx.owner_id, target_id, DeletionFilter::Active)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Target folder {target_id} not found"))
                            .with_code(codes::FOLDER_NOT_FOUND)
                    })?;
                if is_descendant_path(&folder.path, &target.path) {
                    return Err(into_self());
                }
                (Some(target.path), target.depth + 1)
            }
            None => (None, 0),
        };

        self.ensure_unique_name(ctx, new_parent_id, &folder.name, Some(folder.id))
            .await?;

        let depth_delta = new_depth - folder.depth;
        let deepest = self
            .folders
            .max_descendant_depth(ctx.owner_id, folder.id)
            .await?
            .unwrap_or(folder.depth);
        self.check_depth(deepest + depth_delta)?;

        let new_path = child_path(parent_path.as_deref(), &folder.name);
        let (moved, descendants) = self
            .folders
            .relocate(&FolderRelocation {
                owner_id: ctx.owner_id,
                folder_id,
                old_path: folder.path.clone(),
                name: folder.name.clone(),
                parent_id: new_parent_id,
                new_path,
                new_depth,
                depth_delta,
            })
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            old_path = %folder.path,
            new_path = %moved.path,
            depth_delta,
            descendants,
            "Folder moved"
        );
        Ok(moved)
    }

    /// Soft-deletes a folder, its descendants and every document inside them.
    ///
    /// Each document keeps a snapshot of its folder so it can find its way
    /// back even after the folder is purged.
    pub async fn soft_delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<SoftDeleteSummary> {
        let folder = self.load(ctx, folder_id, DeletionFilter::Active).await?;
        let subtree = self
            .folders
            .mark_deleted_subtree(ctx.owner_id, folder.id, ctx.request_time)
            .await?;
        let snapshots: Vec<DeletedFolderInfo> =
            subtree.iter().map(DeletedFolderInfo::from).collect();
        let documents = self
            .documents
            .soft_delete_in_folders(ctx.owner_id, &snapshots, ctx.request_time)
            .await?;

        let summary = SoftDeleteSummary {
            folders: subtree.len() as u64,
            documents,
        };
        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            path = %folder.path,
            folders = summary.folders,
            documents = summary.documents,
            "Folder moved to trash"
        );
        Ok(summary)
    }

    /// Restores one soft-deleted folder. Descendants stay deleted.
    ///
    /// The parent must be active, and no active sibling may have taken the
    /// folder's name in the meantime.
    pub async fn restore_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Folder> {
        let folder = self.load(ctx, folder_id, DeletionFilter::Deleted).await?;

        if let Some(parent_id) = folder.parent_id {
            let parent = self
                .folders
                .find_by_id(ctx.owner_id, parent_id, DeletionFilter::Any)
                .await?;
            if !parent.is_some_and(|p| p.is_active()) {
                return Err(AppError::validation(
                    "Parent folder is deleted; restore it first",
                )
                .with_code(codes::FOLDER_PARENT_DELETED));
            }
        }

        self.ensure_unique_name(ctx, folder.parent_id, &folder.name, Some(folder.id))
            .await?;

        let restored = self.folders.restore(ctx.owner_id, folder_id).await?;
        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            path = %restored.path,
            "Folder restored"
        );
        Ok(restored)
    }

    /// Permanently deletes a folder and its descendants in any state.
    ///
    /// Documents inside are detached to the root level, not deleted.
    pub async fn permanent_delete_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<PermanentDeleteSummary> {
        let folder = self.load(ctx, folder_id, DeletionFilter::Any).await?;
        let descendants = self
            .folders
            .find_descendants(ctx.owner_id, folder.id, DeletionFilter::Any)
            .await?;

        let mut ids = Vec::with_capacity(descendants.len() + 1);
        ids.push(folder.id);
        ids.extend(descendants.iter().map(|f| f.id));

        let documents_detached = self
            .documents
            .detach_from_folders(ctx.owner_id, &ids)
            .await?;
        let folders_removed = self.folders.delete_many(ctx.owner_id, &ids).await?;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            path = %folder.path,
            folders_removed,
            documents_detached,
            "Folder permanently deleted"
        );
        Ok(PermanentDeleteSummary {
            folders_removed,
            documents_detached,
        })
    }
}
