//! Folder domain entities.

pub mod model;
pub mod path;
pub mod query;
pub mod tree;

pub use model::{Breadcrumb, CreateFolder, Folder, FolderRelocation, FolderWithCounts};
pub use query::{FolderQuery, FolderScope, FolderSortField};
pub use tree::{FolderNode, FolderTree};
