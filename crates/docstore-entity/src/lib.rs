//! # docstore-entity
//!
//! Domain entity models for DocStore. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` in addition to `Serialize`/`Deserialize`.

pub mod document;
pub mod folder;
pub mod quota;
