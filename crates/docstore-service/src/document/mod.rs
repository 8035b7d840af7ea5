//! Document lifecycle engine.

mod lifecycle;
mod recreate;
pub mod service;

pub use lifecycle::RestoreOutcome;
pub use service::{
    DocumentService, PresignedUpload, RegisterUploadRequest, UpdateDocumentRequest,
    UploadDocumentRequest,
};
