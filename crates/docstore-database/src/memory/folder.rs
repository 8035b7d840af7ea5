use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use docstore_core::error::{AppError, codes};
use docstore_core::result::AppResult;
use docstore_core::types::{PageRequest, PageResponse};
use docstore_entity::folder::path::rebase;
use docstore_entity::folder::{
    CreateFolder, Folder, FolderQuery, FolderRelocation, FolderScope, FolderSortField,
};

use crate::store::{DeletionFilter, FolderStore};

/// In-memory [`FolderStore`].
#[derive(Debug, Default)]
pub struct MemoryFolderStore {
    folders: RwLock<HashMap<Uuid, Folder>>,
}

impl MemoryFolderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored folders in any state.
    pub async fn len(&self) -> usize {
        self.folders.read().await.len()
    }

    /// Whether the store holds no folders.
    pub async fn is_empty(&self) -> bool {
        self.folders.read().await.is_empty()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::not_found(format!("Folder {id} not found")).with_code(codes::FOLDER_NOT_FOUND)
}

fn by_depth_then_name(a: &Folder, b: &Folder) -> std::cmp::Ordering {
    a.depth
        .cmp(&b.depth)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// IDs of every folder below `root`, following `parent_id` links.
fn subtree_ids(folders: &HashMap<Uuid, Folder>, owner_id: Uuid, root: Uuid) -> HashSet<Uuid> {
    let mut found = HashSet::new();
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        for folder in folders.values() {
            if folder.owner_id == owner_id
                && folder.parent_id == Some(parent)
                && found.insert(folder.id)
            {
                frontier.push(folder.id);
            }
        }
    }
    found
}

/// Enforce the active sibling-name constraint the database index provides.
fn check_sibling_name(
    folders: &HashMap<Uuid, Folder>,
    owner_id: Uuid,
    parent_id: Option<Uuid>,
    name: &str,
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    let lowered = name.to_lowercase();
    let taken = folders.values().any(|f| {
        f.owner_id == owner_id
            && f.parent_id == parent_id
            && !f.is_deleted
            && Some(f.id) != exclude_id
            && f.name.to_lowercase() == lowered
    });
    if taken {
        return Err(
            AppError::conflict(format!("A folder named '{name}' already exists here"))
                .with_code(codes::FOLDER_NAME_EXISTS),
        );
    }
    Ok(())
}

#[async_trait]
impl FolderStore for MemoryFolderStore {
    async fn find_by_id(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Option<Folder>> {
        let folders = self.folders.read().await;
        Ok(folders
            .get(&id)
            .filter(|f| f.owner_id == owner_id && filter.matches(f.is_deleted))
            .cloned())
    }

    async fn find_by_path(&self, owner_id: Uuid, path: &str) -> AppResult<Option<Folder>> {
        let folders = self.folders.read().await;
        Ok(folders
            .values()
            .filter(|f| f.owner_id == owner_id && !f.is_deleted && f.path == path)
            .min_by_key(|f| f.created_at)
            .cloned())
    }

    async fn find_sibling_by_name(
        &self,
        owner_id: Uuid,
        parent_id: Option<Uuid>,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> AppResult<Option<Folder>> {
        let lowered = name.to_lowercase();
        let folders = self.folders.read().await;
        Ok(folders
            .values()
            .find(|f| {
                f.owner_id == owner_id
                    && f.parent_id == parent_id
                    && !f.is_deleted
                    && Some(f.id) != exclude_id
                    && f.name.to_lowercase() == lowered
            })
            .cloned())
    }

    async fn find_descendants(
        &self,
        owner_id: Uuid,
        id: Uuid,
        filter: DeletionFilter,
    ) -> AppResult<Vec<Folder>> {
        let folders = self.folders.read().await;
        let ids = subtree_ids(&folders, owner_id, id);
        let mut found: Vec<Folder> = ids
            .iter()
            .filter_map(|id| folders.get(id))
            .filter(|f| filter.matches(f.is_deleted))
            .cloned()
            .collect();
        found.sort_by(by_depth_then_name);
        Ok(found)
    }

    async fn max_descendant_depth(&self, owner_id: Uuid, id: Uuid) -> AppResult<Option<i32>> {
        let folders = self.folders.read().await;
        Ok(subtree_ids(&folders, owner_id, id)
            .iter()
            .filter_map(|id| folders.get(id))
            .map(|f| f.depth)
            .max())
    }

    async fn find_all(&self, owner_id: Uuid, filter: DeletionFilter) -> AppResult<Vec<Folder>> {
        let folders = self.folders.read().await;
        let mut found: Vec<Folder> = folders
            .values()
            .filter(|f| f.owner_id == owner_id && filter.matches(f.is_deleted))
            .cloned()
            .collect();
        found.sort_by(by_depth_then_name);
        Ok(found)
    }

    async fn list(
        &self,
        owner_id: Uuid,
        query: &FolderQuery,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Folder>> {
        let search = query
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let folders = self.folders.read().await;
        let mut found: Vec<Folder> = folders
            .values()
            .filter(|f| f.owner_id == owner_id && !f.is_deleted)
            .filter(|f| match query.scope {
                FolderScope::All => true,
                FolderScope::Root => f.parent_id.is_none(),
                FolderScope::Children(parent_id) => f.parent_id == Some(parent_id),
            })
            .filter(|f| {
                search
                    .as_deref()
                    .is_none_or(|s| f.name.to_lowercase().contains(s))
            })
            .cloned()
            .collect();

        found.sort_by(|a, b| {
            let ordering = match query.sort_by {
                FolderSortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
                FolderSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                FolderSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                FolderSortField::Path => a.path.cmp(&b.path),
                FolderSortField::Depth => a.depth.cmp(&b.depth),
            };
            query
                .sort_direction
                .apply(ordering)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(page.paginate(found))
    }

    async fn count_children(&self, owner_id: Uuid, id: Uuid) -> AppResult<u64> {
        let folders = self.folders.read().await;
        Ok(folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.parent_id == Some(id) && !f.is_deleted)
            .count() as u64)
    }

    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut folders = self.folders.write().await;
        check_sibling_name(&folders, data.owner_id, data.parent_id, &data.name, None)?;

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::now_v7(),
            owner_id: data.owner_id,
            parent_id: data.parent_id,
            name: data.name.clone(),
            path: data.path.clone(),
            depth: data.depth,
            metadata: data.metadata.clone(),
            is_deleted: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn relocate(&self, change: &FolderRelocation) -> AppResult<(Folder, u64)> {
        let mut folders = self.folders.write().await;
        if !folders
            .get(&change.folder_id)
            .is_some_and(|f| f.owner_id == change.owner_id)
        {
            return Err(not_found(change.folder_id));
        }
        check_sibling_name(
            &folders,
            change.owner_id,
            change.parent_id,
            &change.name,
            Some(change.folder_id),
        )?;

        let now = Utc::now();
        let mut rewritten = 0;
        for id in subtree_ids(&folders, change.owner_id, change.folder_id) {
            let Some(folder) = folders.get_mut(&id) else {
                continue;
            };
            if let Some(path) = rebase(&folder.path, &change.old_path, &change.new_path) {
                folder.path = path;
                folder.depth += change.depth_delta;
                folder.updated_at = now;
                rewritten += 1;
            }
        }

        let folder = folders
            .get_mut(&change.folder_id)
            .ok_or_else(|| not_found(change.folder_id))?;
        folder.name = change.name.clone();
        folder.parent_id = change.parent_id;
        folder.path = change.new_path.clone();
        folder.depth = change.new_depth;
        folder.updated_at = now;
        Ok((folder.clone(), rewritten))
    }

    async fn mark_deleted_subtree(
        &self,
        owner_id: Uuid,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Vec<Folder>> {
        let mut folders = self.folders.write().await;
        if !folders.get(&id).is_some_and(|f| f.owner_id == owner_id) {
            return Err(not_found(id));
        }
        let mut ids = subtree_ids(&folders, owner_id, id);
        ids.insert(id);

        let now = Utc::now();
        let mut subtree = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(folder) = folders.get_mut(&id) else {
                continue;
            };
            if !folder.is_deleted {
                folder.is_deleted = true;
                folder.deleted_at = Some(at);
                folder.updated_at = now;
            }
            subtree.push(folder.clone());
        }
        subtree.sort_by(by_depth_then_name);
        Ok(subtree)
    }

    async fn restore(&self, owner_id: Uuid, id: Uuid) -> AppResult<Folder> {
        let mut folders = self.folders.write().await;
        let (parent_id, name) = match folders.get(&id) {
            Some(f) if f.owner_id == owner_id => (f.parent_id, f.name.clone()),
            _ => return Err(not_found(id)),
        };
        check_sibling_name(&folders, owner_id, parent_id, &name, Some(id))?;

        let folder = folders.get_mut(&id).ok_or_else(|| not_found(id))?;
        folder.is_deleted = false;
        folder.deleted_at = None;
        folder.updated_at = Utc::now();
        Ok(folder.clone())
    }

    async fn delete_many(&self, owner_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let mut folders = self.folders.write().await;
        let mut removed = 0;
        for id in ids {
            if folders.get(id).is_some_and(|f| f.owner_id == owner_id) {
                folders.remove(id);
                removed += 1;
            }
        }
        Ok(removed)
    }
}
