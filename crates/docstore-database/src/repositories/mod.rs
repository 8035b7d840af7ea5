//! PostgreSQL implementations of the metadata store traits.

pub mod document;
pub mod folder;
pub mod quota;

pub use document::PgDocumentRepository;
pub use folder::PgFolderRepository;
pub use quota::PgQuotaRepository;

use docstore_core::error::{AppError, ErrorKind};

/// Escape `LIKE` metacharacters so user-controlled text matches literally.
///
/// Pair with `ESCAPE '\'` in the query.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `LIKE` pattern for a case-insensitive substring search on a lowered column.
pub fn contains_pattern(search: &str) -> String {
    format!("%{}%", escape_like(&search.to_lowercase()))
}

/// Wrap a sqlx error with context.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
