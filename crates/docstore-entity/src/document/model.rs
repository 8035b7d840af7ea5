//! Document entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::folder::Folder;

/// Where a soft-deleted document used to live.
///
/// Captured when a document inside a folder is deleted on its own, so the
/// folder chain can be rebuilt at restore time even if the folder itself
/// was purged in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedFolderInfo {
    /// The containing folder's ID.
    pub folder_id: Uuid,
    /// The containing folder's name.
    pub name: String,
    /// The containing folder's path.
    pub path: String,
    /// The containing folder's parent.
    pub parent_id: Option<Uuid>,
}

impl From<&Folder> for DeletedFolderInfo {
    fn from(folder: &Folder) -> Self {
        Self {
            folder_id: folder.id,
            name: folder.name.clone(),
            path: folder.path.clone(),
            parent_id: folder.parent_id,
        }
    }
}

/// A document stored in DocStore.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    /// Unique document identifier.
    pub id: Uuid,
    /// The document owner.
    pub owner_id: Uuid,
    /// Containing folder (None = root).
    pub folder_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Name the document was uploaded with.
    pub original_name: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Content size in bytes.
    pub size_bytes: i64,
    /// Lowercase extension without the dot.
    pub extension: Option<String>,
    /// Key of the content in object storage.
    pub storage_key: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Arbitrary metadata (JSON object).
    pub metadata: serde_json::Value,
    /// Incremented on every metadata update.
    pub version: i32,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// When the document was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Folder snapshot taken when the document was deleted individually.
    #[sqlx(json(nullable))]
    pub deleted_folder_info: Option<DeletedFolderInfo>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Check if the document sits at the owner's root level.
    pub fn is_at_root(&self) -> bool {
        self.folder_id.is_none()
    }

    /// Check if this document carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Get the extension (lowercase) of a file name, if any.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.trim()))
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .map(|(_, ext)| ext.to_lowercase())
}

/// Data required to create a new document record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Pre-generated document ID (the storage key embeds it).
    pub id: Uuid,
    /// The document owner.
    pub owner_id: Uuid,
    /// Containing folder.
    pub folder_id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Original upload name.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Lowercase extension.
    pub extension: Option<String>,
    /// Object storage key.
    pub storage_key: String,
    /// Tags.
    pub tags: Vec<String>,
    /// Metadata.
    pub metadata: serde_json::Value,
}
