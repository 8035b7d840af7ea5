//! Document management CLI commands.

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use docstore_core::error::AppError;
use docstore_core::result::AppResult;
use docstore_core::types::PageRequest;
use docstore_entity::document::{Document, DocumentQuery, DocumentScope};
use docstore_service::document::UploadDocumentRequest;

use super::{Engines, parse_folder_target};
use crate::output::{self, OutputFormat};

/// Arguments for document commands
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document subcommand
    #[command(subcommand)]
    pub command: DocumentCommand,
}

/// Document subcommands
#[derive(Debug, Subcommand)]
pub enum DocumentCommand {
    /// Upload a local file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Target folder ID (omit for root)
        #[arg(long)]
        folder: Option<Uuid>,
        /// Override the document name
        #[arg(short, long)]
        name: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// List documents
    List {
        /// Folder ID, or `root` for root-level documents
        #[arg(long)]
        folder: Option<String>,
        /// Only documents with this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
        /// List the trash instead
        #[arg(long)]
        deleted: bool,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(long, default_value = "50")]
        page_size: u64,
    },
    /// Show one document
    Show {
        /// Document ID
        id: Uuid,
    },
    /// Move a document to the trash
    Delete {
        /// Document ID
        id: Uuid,
    },
    /// Restore a document from the trash
    Restore {
        /// Document ID
        id: Uuid,
        /// Restore to the root level instead of recreating a purged folder
        #[arg(long)]
        no_recreate: bool,
    },
    /// Permanently delete a document and its content
    Purge {
        /// Document ID
        id: Uuid,
    },
    /// Print a presigned download URL
    Url {
        /// Document ID
        id: Uuid,
    },
}

/// Document display row
#[derive(Debug, Serialize, Tabled)]
struct DocumentRow {
    id: String,
    name: String,
    folder: String,
    size_bytes: i64,
    mime_type: String,
    version: i32,
    updated_at: String,
}

impl From<&Document> for DocumentRow {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone(),
            folder: d
                .folder_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "/".to_string()),
            size_bytes: d.size_bytes,
            mime_type: d.mime_type.clone(),
            version: d.version,
            updated_at: d.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn print_document(document: &Document, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(document),
        OutputFormat::Table => {
            output::print_kv("ID", &document.id.to_string());
            output::print_kv("Name", &document.name);
            output::print_kv(
                "Folder",
                &document
                    .folder_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "(root)".to_string()),
            );
            output::print_kv("Size", &format!("{} bytes", document.size_bytes));
            output::print_kv("MIME type", &document.mime_type);
            output::print_kv("Tags", &document.tags.join(", "));
            output::print_kv("Version", &document.version.to_string());
            output::print_kv("Storage key", &document.storage_key);
            output::print_kv("Deleted", &document.is_deleted.to_string());
            if let Some(info) = &document.deleted_folder_info {
                output::print_kv("Deleted from", &info.path);
            }
        }
    }
}

/// Execute document commands
pub async fn execute(
    args: &DocumentArgs,
    engines: &Engines,
    format: OutputFormat,
) -> AppResult<()> {
    let ctx = &engines.ctx;
    let documents = &engines.documents;

    match &args.command {
        DocumentCommand::Upload {
            file,
            folder,
            name,
            tags,
        } => {
            let name = match name {
                Some(name) => name.clone(),
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::validation(format!("Cannot derive a name from {}", file.display()))
                    })?,
            };
            let data = tokio::fs::read(file).await?;
            let document = documents
                .upload(
                    ctx,
                    UploadDocumentRequest {
                        name,
                        folder_id: *folder,
                        tags: tags.clone(),
                        data: Bytes::from(data),
                        ..UploadDocumentRequest::default()
                    },
                )
                .await?;
            output::print_success(&format!(
                "Document '{}' uploaded (id: {}, {} bytes)",
                document.name, document.id, document.size_bytes
            ));
        }
        DocumentCommand::List {
            folder,
            tag,
            search,
            deleted,
            page,
            page_size,
        } => {
            let scope = match folder.as_deref() {
                None => DocumentScope::Any,
                Some(raw) => match parse_folder_target(Some(raw))? {
                    Some(id) => DocumentScope::Folder(id),
                    None => DocumentScope::Root,
                },
            };
            let query = DocumentQuery {
                scope,
                deleted: *deleted,
                tag: tag.clone(),
                search: search.clone(),
                ..DocumentQuery::default()
            };
            let result = documents
                .list_documents(ctx, &query, PageRequest::new(*page, *page_size))
                .await?;
            let rows: Vec<DocumentRow> = result.items.iter().map(DocumentRow::from).collect();
            output::print_list(&rows, format);
            output::print_page_footer(result.page, result.total_pages, result.total_items, format);
        }
        DocumentCommand::Show { id } => {
            let document = documents.get_document(ctx, *id).await?;
            print_document(&document, format);
        }
        DocumentCommand::Delete { id } => {
            let document = documents.soft_delete(ctx, *id).await?;
            output::print_success(&format!("Document '{}' moved to the trash", document.name));
        }
        DocumentCommand::Restore { id, no_recreate } => {
            let outcome = documents.restore(ctx, *id, !no_recreate).await?;
            output::print_success(&format!("Document '{}' restored", outcome.document.name));
            if outcome.folder_recreated {
                output::print_warning("Its folder no longer existed and was recreated.");
            } else if outcome.document.folder_id.is_none() {
                output::print_kv("Location", "(root)");
            }
        }
        DocumentCommand::Purge { id } => {
            let document = documents.permanent_delete(ctx, *id).await?;
            output::print_success(&format!(
                "Document '{}' permanently deleted ({} bytes released)",
                document.name, document.size_bytes
            ));
        }
        DocumentCommand::Url { id } => {
            let url = documents.download_url(ctx, *id).await?;
            match format {
                OutputFormat::Json => output::print_json(&url),
                OutputFormat::Table => {
                    println!("{}", url.url);
                    output::print_kv("Expires", &url.expires_at.to_rfc3339());
                }
            }
        }
    }

    Ok(())
}
