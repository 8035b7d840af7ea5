//! # docstore-service
//!
//! The folder tree engine and the document lifecycle engine. Each service
//! is built by constructor injection from `Arc`-wrapped store, storage and
//! quota implementations; nothing is reached through globals.

pub mod context;
pub mod document;
pub mod folder;
pub mod validation;

pub use context::RequestContext;
pub use document::DocumentService;
pub use folder::{FolderService, TreeService};
