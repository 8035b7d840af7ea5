//! Soft delete and restore of documents.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use docstore_core::result::AppResult;
use docstore_database::store::DeletionFilter;
use docstore_entity::document::{DeletedFolderInfo, Document};

use super::recreate::recreate_folder_chain;
use super::service::DocumentService;
use crate::context::RequestContext;

/// Result of restoring a document.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    /// The restored document.
    pub document: Document,
    /// Whether at least one folder had to be created to hold it.
    pub folder_recreated: bool,
}

impl DocumentService {
    /// Moves a document to the trash, remembering where it lived.
    pub async fn soft_delete(&self, ctx: &RequestContext, document_id: Uuid) -> AppResult<Document> {
        let document = self.load(ctx, document_id, DeletionFilter::Active).await?;

        let snapshot = match document.folder_id {
            Some(folder_id) => self
                .folders
                .find_by_id(ctx.owner_id, folder_id, DeletionFilter::Any)
                .await?
                .map(|folder| DeletedFolderInfo::from(&folder)),
            None => None,
        };

        let deleted = self
            .documents
            .mark_deleted(ctx.owner_id, document_id, ctx.request_time, snapshot)
            .await?;
        info!(
            owner_id = %ctx.owner_id,
            document_id = %document_id,
            folder_id = ?deleted.folder_id,
            "Document moved to trash"
        );
        Ok(deleted)
    }

    /// Restores a trashed document.
    ///
    /// The document goes back to its folder while that folder record still
    /// exists, even if it is in the trash itself. Once the folder has been
    /// purged, `recreate_folder` rebuilds the chain recorded at deletion
    /// time; without it the document lands at the root level.
    pub async fn restore(
        &self,
        ctx: &RequestContext,
        document_id: Uuid,
        recreate_folder: bool,
    ) -> AppResult<RestoreOutcome> {
        let document = self.load(ctx, document_id, DeletionFilter::Deleted).await?;
        let (target, folder_recreated) = self
            .restore_target(ctx, &document, recreate_folder)
            .await?;

        let restored = self
            .documents
            .restore(ctx.owner_id, document_id, target)
            .await?;
        info!(
            owner_id = %ctx.owner_id,
            document_id = %document_id,
            folder_id = ?target,
            folder_recreated,
            "Document restored"
        );
        Ok(RestoreOutcome {
            document: restored,
            folder_recreated,
        })
    }

    async fn restore_target(
        &self,
        ctx: &RequestContext,
        document: &Document,
        recreate_folder: bool,
    ) -> AppResult<(Option<Uuid>, bool)> {
        let Some(snapshot) = &document.deleted_folder_info else {
            // No snapshot: keep the folder link while the record exists.
            let Some(folder_id) = document.folder_id else {
                return Ok((None, false));
            };
            let exists = self
                .folders
                .find_by_id(ctx.owner_id, folder_id, DeletionFilter::Any)
                .await?
                .is_some();
            return Ok((exists.then_some(folder_id), false));
        };

        // A trashed folder still counts: the document reappears with it.
        let original = self
            .folders
            .find_by_id(ctx.owner_id, snapshot.folder_id, DeletionFilter::Any)
            .await?;
        if original.is_some() {
            return Ok((Some(snapshot.folder_id), false));
        }
        if !recreate_folder {
            return Ok((None, false));
        }

        match recreate_folder_chain(
            self.folders.as_ref(),
            ctx.owner_id,
            &snapshot.path,
            self.folder_config.max_depth,
        )
        .await
        {
            Ok(Some(chain)) => Ok((Some(chain.folder.id), chain.created > 0)),
            Ok(None) => Ok((None, false)),
            Err(e) => {
                warn!(
                    document_id = %document.id,
                    path = %snapshot.path,
                    error = %e,
                    "Folder recreation failed, restoring to root"
                );
                Ok((None, false))
            }
        }
    }
}
