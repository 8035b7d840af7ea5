//! # docstore-core
//!
//! Core crate for DocStore. Contains the capability traits consumed by the
//! folder and document engines, configuration schemas, pagination/sorting
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DocStore crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
