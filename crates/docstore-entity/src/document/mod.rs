//! Document domain entities.

pub mod model;
pub mod query;

pub use model::{CreateDocument, DeletedFolderInfo, Document};
pub use query::{DocumentQuery, DocumentScope, DocumentSortField};
