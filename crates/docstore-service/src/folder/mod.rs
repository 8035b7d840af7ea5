//! Folder tree engine.

pub mod service;
pub mod tree;

pub use service::{
    CreateFolderRequest, FolderService, PermanentDeleteSummary, SoftDeleteSummary,
};
pub use tree::TreeService;
