//! Folder tree building and breadcrumbs.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use docstore_core::error::{AppError, codes};
use docstore_core::result::AppResult;
use docstore_database::store::{DeletionFilter, DocumentStore, FolderStore};
use docstore_entity::folder::{Breadcrumb, Folder, FolderNode, FolderTree};

use crate::context::RequestContext;

/// Builds folder trees and breadcrumb trails.
#[derive(Debug, Clone)]
pub struct TreeService {
    folders: Arc<dyn FolderStore>,
    documents: Arc<dyn DocumentStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folders: Arc<dyn FolderStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { folders, documents }
    }

    async fn load_active(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_by_id(ctx.owner_id, folder_id, DeletionFilter::Active)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Folder {folder_id} not found"))
                    .with_code(codes::FOLDER_NOT_FOUND)
            })
    }

    /// Gets the breadcrumb trail from the root level down to the folder.
    pub async fn get_breadcrumbs(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<Breadcrumb>> {
        let folder = self.load_active(ctx, folder_id).await?;

        let mut trail = vec![Breadcrumb::from(&folder)];
        let mut next = folder.parent_id;
        // A well-formed chain is never longer than the folder's depth.
        let mut remaining = folder.depth;
        while let Some(parent_id) = next {
            if remaining <= 0 {
                break;
            }
            remaining -= 1;
            let Some(parent) = self
                .folders
                .find_by_id(ctx.owner_id, parent_id, DeletionFilter::Any)
                .await?
            else {
                break;
            };
            trail.push(Breadcrumb::from(&parent));
            next = parent.parent_id;
        }

        trail.reverse();
        Ok(trail)
    }

    /// Builds the tree of active folders, either below one folder or for
    /// the whole root level.
    pub async fn get_folder_tree(
        &self,
        ctx: &RequestContext,
        root_id: Option<Uuid>,
    ) -> AppResult<FolderTree> {
        let (roots, folders) = match root_id {
            Some(id) => {
                let root = self.load_active(ctx, id).await?;
                let descendants = self
                    .folders
                    .find_descendants(ctx.owner_id, root.id, DeletionFilter::Active)
                    .await?;
                (vec![root], descendants)
            }
            None => {
                let all = self
                    .folders
                    .find_all(ctx.owner_id, DeletionFilter::Active)
                    .await?;
                let (roots, rest): (Vec<Folder>, Vec<Folder>) =
                    all.into_iter().partition(Folder::is_root);
                (roots, rest)
            }
        };

        if roots.is_empty() {
            return Ok(FolderTree::empty());
        }

        let ids: Vec<Uuid> = roots.iter().chain(&folders).map(|f| f.id).collect();
        let document_counts = self.documents.count_in_folders(ctx.owner_id, &ids).await?;

        let mut children: HashMap<Uuid, Vec<&Folder>> = HashMap::new();
        for folder in &folders {
            if let Some(parent_id) = folder.parent_id {
                children.entry(parent_id).or_default().push(folder);
            }
        }

        let mut nodes: Vec<FolderNode> = roots
            .iter()
            .map(|root| build_node(root, &children, &document_counts))
            .collect();
        sort_nodes(&mut nodes);
        Ok(FolderTree::from_roots(nodes))
    }
}

fn build_node(
    folder: &Folder,
    children: &HashMap<Uuid, Vec<&Folder>>,
    document_counts: &HashMap<Uuid, u64>,
) -> FolderNode {
    let mut child_nodes: Vec<FolderNode> = children
        .get(&folder.id)
        .map(|kids| {
            kids.iter()
                .map(|child| build_node(child, children, document_counts))
                .collect()
        })
        .unwrap_or_default();
    sort_nodes(&mut child_nodes);

    FolderNode {
        id: folder.id,
        name: folder.name.clone(),
        path: folder.path.clone(),
        depth: folder.depth,
        child_count: child_nodes.len() as u64,
        document_count: document_counts.get(&folder.id).copied().unwrap_or(0),
        children: child_nodes,
    }
}

fn sort_nodes(nodes: &mut [FolderNode]) {
    nodes.sort_by_key(|n| n.name.to_lowercase());
}
