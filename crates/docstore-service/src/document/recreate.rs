//! Rebuilding a folder chain from a deleted document's folder snapshot.

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use docstore_core::error::{AppError, codes};
use docstore_core::result::AppResult;
use docstore_database::store::FolderStore;
use docstore_entity::folder::path::{child_path, segments};
use docstore_entity::folder::{CreateFolder, Folder};

/// The folder at the end of a rebuilt chain.
#[derive(Debug, Clone)]
pub(crate) struct RecreatedChain {
    /// The deepest folder of the chain.
    pub folder: Folder,
    /// Folders that had to be created.
    pub created: u32,
}

/// Walk `path` from the root down, reusing each active folder that already
/// sits at the cumulative path and creating the missing ones.
///
/// Existing folders are matched by exact path first and then by
/// case-insensitive sibling name, so this never trips the sibling-name
/// constraint. Returns None for an empty path.
pub(crate) async fn recreate_folder_chain(
    folders: &dyn FolderStore,
    owner_id: Uuid,
    path: &str,
    max_depth: i32,
) -> AppResult<Option<RecreatedChain>> {
    let mut parent: Option<Folder> = None;
    let mut created = 0;

    for (depth, name) in segments(path).into_iter().enumerate() {
        // Saturates; anything past max_depth is rejected below.
        let depth = i32::try_from(depth).unwrap_or(i32::MAX);
        let parent_id = parent.as_ref().map(|p| p.id);
        let cumulative = child_path(parent.as_ref().map(|p| p.path.as_str()), name);

        let existing = match folders.find_by_path(owner_id, &cumulative).await? {
            Some(folder) => Some(folder),
            None => {
                folders
                    .find_sibling_by_name(owner_id, parent_id, name, None)
                    .await?
            }
        };

        let folder = match existing {
            Some(folder) => folder,
            None => {
                if depth >= max_depth {
                    return Err(AppError::validation(format!(
                        "Cannot recreate '{cumulative}' beyond {max_depth} levels"
                    ))
                    .with_code(codes::FOLDER_MAX_DEPTH_EXCEEDED));
                }
                let folder = folders
                    .insert(&CreateFolder {
                        owner_id,
                        parent_id,
                        name: name.to_string(),
                        path: cumulative,
                        depth,
                        metadata: json!({}),
                    })
                    .await?;
                debug!(folder_id = %folder.id, path = %folder.path, "Recreated folder");
                created += 1;
                folder
            }
        };
        parent = Some(folder);
    }

    Ok(parent.map(|folder| RecreatedChain { folder, created }))
}
