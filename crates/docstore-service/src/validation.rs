//! Name validation shared by the folder and document engines.

use docstore_core::error::{AppError, codes};
use docstore_core::result::AppResult;

/// Trim and validate a folder name.
pub fn folder_name(raw: &str, max_len: usize) -> AppResult<String> {
    let name = raw.trim();
    let invalid = |reason: &str| {
        Err(AppError::validation(format!("Invalid folder name: {reason}"))
            .with_code(codes::FOLDER_NAME_INVALID))
    };
    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if name.chars().count() > max_len {
        return invalid(&format!("name exceeds {max_len} characters"));
    }
    if name.contains('/') {
        return invalid("name cannot contain '/'");
    }
    if name == "." || name == ".." {
        return invalid("reserved name");
    }
    Ok(name.to_string())
}

/// Trim and validate a document name.
pub fn document_name(raw: &str, max_len: usize) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "Document name must be between 1 and {max_len} characters"
        ))
        .with_code(codes::DOCUMENT_NAME_INVALID));
    }
    Ok(name.to_string())
}

/// Trim tags, drop empty ones and remove duplicates, keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Default to an empty object and reject non-object metadata.
pub fn metadata_object(metadata: Option<serde_json::Value>) -> AppResult<serde_json::Value> {
    match metadata {
        None | Some(serde_json::Value::Null) => Ok(serde_json::json!({})),
        Some(value) if value.is_object() => Ok(value),
        Some(_) => Err(AppError::validation("Metadata must be a JSON object")),
    }
}
