//! Folder listing filters and sort options.

use docstore_core::types::SortDirection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which part of the tree a listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "parent_id", rename_all = "snake_case")]
pub enum FolderScope {
    /// Every folder of the owner.
    #[default]
    All,
    /// Root-level folders only.
    Root,
    /// Direct children of one folder.
    Children(Uuid),
}

/// Sortable folder columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderSortField {
    /// Sort by name.
    #[default]
    Name,
    /// Sort by creation time.
    CreatedAt,
    /// Sort by last update time.
    UpdatedAt,
    /// Sort by materialized path.
    Path,
    /// Sort by depth.
    Depth,
}

impl FolderSortField {
    /// Column expression used in `ORDER BY`.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "lower(name)",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Path => "path",
            Self::Depth => "depth",
        }
    }
}

/// Filter for listing active folders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderQuery {
    /// Tree scope.
    #[serde(default)]
    pub scope: FolderScope,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    /// Sort column.
    #[serde(default)]
    pub sort_by: FolderSortField,
    /// Sort direction.
    #[serde(default)]
    pub sort_direction: SortDirection,
}
