//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in an owner's folder tree.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// The folder owner. Every lookup is scoped by it.
    pub owner_id: Uuid,
    /// Parent folder ID (None for root-level folders).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path (e.g., `/Docs/2024`).
    pub path: String,
    /// Number of ancestors (0 for root-level folders).
    pub depth: i32,
    /// Arbitrary caller-supplied metadata (JSON object).
    pub metadata: serde_json::Value,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// When the folder was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this folder is active (not soft-deleted).
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Data required to create a new folder.
///
/// `path` and `depth` are computed by the folder service, never taken from
/// callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The folder owner.
    pub owner_id: Uuid,
    /// Parent folder (None for root).
    pub parent_id: Option<Uuid>,
    /// Folder name.
    pub name: String,
    /// Full materialized path.
    pub path: String,
    /// Depth in the tree.
    pub depth: i32,
    /// Arbitrary metadata.
    pub metadata: serde_json::Value,
}

/// A structural change to one folder that cascades to its subtree.
///
/// Used for both rename (same parent, new name, `depth_delta == 0`) and
/// move (new parent, same name).
#[derive(Debug, Clone)]
pub struct FolderRelocation {
    /// The folder owner.
    pub owner_id: Uuid,
    /// The folder being relocated.
    pub folder_id: Uuid,
    /// The folder's path before the change.
    pub old_path: String,
    /// The folder's new name.
    pub name: String,
    /// The folder's new parent.
    pub parent_id: Option<Uuid>,
    /// The folder's new path.
    pub new_path: String,
    /// The folder's new depth.
    pub new_depth: i32,
    /// Added to the depth of every descendant.
    pub depth_delta: i32,
}

/// A folder plus the number of direct subfolders and documents it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderWithCounts {
    /// The folder itself.
    #[serde(flatten)]
    pub folder: Folder,
    /// Active direct subfolders.
    pub subfolder_count: u64,
    /// Active documents directly inside the folder.
    pub document_count: u64,
}

/// One element of a root-to-folder breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Folder path.
    pub path: String,
}

impl From<&Folder> for Breadcrumb {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
            path: folder.path.clone(),
        }
    }
}
