//! Unified application error types for DocStore.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Expected, caller-recoverable outcomes
//! additionally carry a machine-readable code from [`codes`].

use std::fmt;
use thiserror::Error;

/// Machine-readable error codes surfaced to callers.
pub mod codes {
    /// The folder does not exist, belongs to another owner, or is in the
    /// wrong deletion state.
    pub const FOLDER_NOT_FOUND: &str = "FOLDER_NOT_FOUND";
    /// A non-deleted sibling with the same (case-insensitive) name exists.
    pub const FOLDER_NAME_EXISTS: &str = "FOLDER_NAME_EXISTS";
    /// The folder name is empty, too long, or contains a path separator.
    pub const FOLDER_NAME_INVALID: &str = "FOLDER_NAME_INVALID";
    /// The operation would place a folder deeper than the configured limit.
    pub const FOLDER_MAX_DEPTH_EXCEEDED: &str = "FOLDER_MAX_DEPTH_EXCEEDED";
    /// A folder cannot be moved into itself or one of its descendants.
    pub const FOLDER_MOVE_INTO_SELF: &str = "FOLDER_MOVE_INTO_SELF";
    /// The folder's parent is still deleted and must be restored first.
    pub const FOLDER_PARENT_DELETED: &str = "FOLDER_PARENT_DELETED";
    /// The document does not exist or is in the wrong deletion state.
    pub const DOCUMENT_NOT_FOUND: &str = "DOCUMENT_NOT_FOUND";
    /// A document with the same ID or storage key is already registered.
    pub const DOCUMENT_EXISTS: &str = "DOCUMENT_EXISTS";
    /// The document name is empty or too long.
    pub const DOCUMENT_NAME_INVALID: &str = "DOCUMENT_NAME_INVALID";
    /// The owner does not have enough quota left.
    pub const QUOTA_EXCEEDED: &str = "QUOTA_EXCEEDED";
    /// The upload is larger than the configured maximum.
    pub const UPLOAD_TOO_LARGE: &str = "UPLOAD_TOO_LARGE";
}

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (duplicate entry, concurrent modification, etc.).
    Conflict,
    /// A database error occurred.
    Database,
    /// A storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified application error used throughout DocStore.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Machine-readable code for domain errors (see [`codes`]).
    pub code: Option<&'static str>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a machine-readable code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Whether this error carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.code == Some(code)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            code: self.code,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
