//! Folder tree limits.

use serde::{Deserialize, Serialize};

/// Limits enforced by the folder tree engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Maximum folder depth (root-level folders have depth 0).
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
    /// Maximum length of a folder or document name, in characters.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_name_length: default_max_name_length(),
        }
    }
}

fn default_max_depth() -> i32 {
    50
}

fn default_max_name_length() -> usize {
    255
}
