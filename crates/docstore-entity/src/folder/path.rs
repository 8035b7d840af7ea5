//! Materialized path helpers.
//!
//! Paths are root-anchored and `/`-separated: `/Docs` for a root-level
//! folder, `/Docs/2024/Q1` for a nested one. A path never ends in `/`.

/// Path separator.
pub const SEPARATOR: char = '/';

/// Path of a child named `name` under `parent_path` (None for root).
pub fn child_path(parent_path: Option<&str>, name: &str) -> String {
    match parent_path {
        Some(parent) => format!("{parent}{SEPARATOR}{name}"),
        None => format!("{SEPARATOR}{name}"),
    }
}

/// Parent portion of `path`, or None when `path` is root-level.
pub fn parent_path(path: &str) -> Option<&str> {
    match path.rfind(SEPARATOR) {
        Some(0) | None => None,
        Some(idx) => Some(&path[..idx]),
    }
}

/// Path obtained by renaming the last segment of `path` to `new_name`.
pub fn renamed_path(path: &str, new_name: &str) -> String {
    child_path(parent_path(path), new_name)
}

/// Whether `candidate` lies strictly below `ancestor`.
pub fn is_descendant_path(ancestor: &str, candidate: &str) -> bool {
    candidate.len() > ancestor.len() + 1
        && candidate.starts_with(ancestor)
        && candidate[ancestor.len()..].starts_with(SEPARATOR)
}

/// Replace the `old_prefix` of a descendant path with `new_prefix`.
///
/// Returns None if `path` is not below `old_prefix`.
pub fn rebase(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    if !is_descendant_path(old_prefix, path) {
        return None;
    }
    Some(format!("{new_prefix}{}", &path[old_prefix.len()..]))
}

/// Non-empty segments of `path`, root first.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_path() {
        assert_eq!(child_path(None, "Docs"), "/Docs");
        assert_eq!(child_path(Some("/Docs"), "2024"), "/Docs/2024");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/Docs"), None);
        assert_eq!(parent_path("/Docs/2024"), Some("/Docs"));
        assert_eq!(parent_path("/a/b/c"), Some("/a/b"));
    }

    #[test]
    fn test_renamed_path() {
        assert_eq!(renamed_path("/Docs", "Papers"), "/Papers");
        assert_eq!(renamed_path("/Docs/2024", "2025"), "/Docs/2025");
    }

    #[test]
    fn test_is_descendant_path_requires_separator() {
        assert!(is_descendant_path("/Docs", "/Docs/2024"));
        assert!(!is_descendant_path("/Docs", "/Docs"));
        assert!(!is_descendant_path("/Docs", "/Docs2024"));
        assert!(!is_descendant_path("/Docs", "/Other/Docs"));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(
            rebase("/Docs/2024/Q1", "/Docs/2024", "/2024").as_deref(),
            Some("/2024/Q1")
        );
        assert_eq!(rebase("/Docs", "/Docs", "/X"), None);
    }

    #[test]
    fn test_special_characters_are_literal() {
        assert!(is_descendant_path("/a.b (1)", "/a.b (1)/c"));
        assert!(!is_descendant_path("/a.b", "/axb/c"));
        assert!(is_descendant_path("/100%_done", "/100%_done/x"));
    }

    #[test]
    fn test_segments_skip_empty() {
        assert_eq!(segments("/A/B"), vec!["A", "B"]);
        assert_eq!(segments("//A//"), vec!["A"]);
        assert!(segments("/").is_empty());
    }
}
