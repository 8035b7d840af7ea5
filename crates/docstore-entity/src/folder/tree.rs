//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in a folder tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderNode {
    /// Folder ID.
    pub id: Uuid,
    /// Folder name.
    pub name: String,
    /// Full path.
    pub path: String,
    /// Depth level.
    pub depth: i32,
    /// Number of child folders.
    pub child_count: u64,
    /// Number of active documents in this folder.
    pub document_count: u64,
    /// Child folder nodes, sorted by name.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of nodes in this subtree, including self.
    pub fn size(&self) -> u64 {
        1 + self.children.iter().map(FolderNode::size).sum::<u64>()
    }
}

/// A folder tree rooted at a specific folder or at the owner's root level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderTree {
    /// The root node(s) of the tree.
    pub roots: Vec<FolderNode>,
    /// Total number of folders in the tree.
    pub total_folders: u64,
}

impl FolderTree {
    /// Create an empty folder tree.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            total_folders: 0,
        }
    }

    /// Build a tree from root nodes, counting every folder.
    pub fn from_roots(roots: Vec<FolderNode>) -> Self {
        let total_folders = roots.iter().map(FolderNode::size).sum();
        Self {
            roots,
            total_folders,
        }
    }
}
