//! Document listing filters and sort options.

use docstore_core::types::SortDirection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which folder a document listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "folder_id", rename_all = "snake_case")]
pub enum DocumentScope {
    /// Documents anywhere.
    #[default]
    Any,
    /// Documents at the root level only.
    Root,
    /// Documents directly inside one folder.
    Folder(Uuid),
}

/// Sortable document columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSortField {
    /// Sort by name.
    Name,
    /// Sort by size.
    Size,
    /// Sort by creation time.
    #[default]
    CreatedAt,
    /// Sort by last update time.
    UpdatedAt,
}

impl DocumentSortField {
    /// Column expression used in `ORDER BY`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "lower(name)",
            Self::Size => "size_bytes",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Filter for listing documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentQuery {
    /// Folder scope.
    #[serde(default)]
    pub scope: DocumentScope,
    /// List soft-deleted documents instead of active ones.
    #[serde(default)]
    pub deleted: bool,
    /// Only documents carrying this tag.
    pub tag: Option<String>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// Sort column.
    #[serde(default)]
    pub sort_by: DocumentSortField,
    /// Sort direction.
    #[serde(default)]
    pub sort_direction: SortDirection,
}
