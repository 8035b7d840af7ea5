//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use docstore_core::result::AppResult;
use docstore_core::types::PageRequest;
use docstore_entity::folder::{Folder, FolderNode, FolderQuery, FolderScope};
use docstore_service::folder::CreateFolderRequest;

use super::{Engines, parse_folder_target};
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a new folder
    Create {
        /// Folder name
        name: String,
        /// Parent folder ID (omit for root)
        #[arg(short, long)]
        parent: Option<Uuid>,
    },
    /// Rename a folder
    Rename {
        /// Folder ID
        id: Uuid,
        /// New name
        name: String,
    },
    /// Move a folder under another folder
    Move {
        /// Folder ID
        id: Uuid,
        /// Target folder ID, or `root`
        #[arg(long)]
        to: String,
    },
    /// Move a folder and everything inside it to the trash
    Delete {
        /// Folder ID
        id: Uuid,
    },
    /// Restore a folder from the trash
    Restore {
        /// Folder ID
        id: Uuid,
    },
    /// Permanently delete a folder subtree (documents move to the root level)
    Purge {
        /// Folder ID
        id: Uuid,
    },
    /// Show one folder with its counts
    Show {
        /// Folder ID
        id: Uuid,
    },
    /// List folders
    List {
        /// Only the children of this folder
        #[arg(long, conflicts_with = "root")]
        parent: Option<Uuid>,
        /// Only root-level folders
        #[arg(long)]
        root: bool,
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(long, default_value = "50")]
        page_size: u64,
    },
    /// List folders in the trash
    Trash {
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(long, default_value = "50")]
        page_size: u64,
    },
    /// Print the folder tree
    Tree {
        /// Start from this folder instead of the root level
        #[arg(long)]
        from: Option<String>,
    },
    /// Print the path from the root level down to a folder
    Breadcrumbs {
        /// Folder ID
        id: Uuid,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    id: String,
    name: String,
    path: String,
    depth: i32,
    deleted: bool,
    updated_at: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            path: f.path.clone(),
            depth: f.depth,
            deleted: f.is_deleted,
            updated_at: f.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

fn print_folders(folders: &[Folder], format: OutputFormat) {
    let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
    output::print_list(&rows, format);
}

fn print_tree(nodes: &[FolderNode], prefix: &str) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let branch = if last { "└── " } else { "├── " };
        let docs = match node.document_count {
            0 => String::new(),
            n => format!(" ({n} documents)"),
        };
        println!("{prefix}{branch}{}/{docs}", node.name);
        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        print_tree(&node.children, &child_prefix);
    }
}

/// Execute folder commands
pub async fn execute(args: &FolderArgs, engines: &Engines, format: OutputFormat) -> AppResult<()> {
    let ctx = &engines.ctx;
    let folders = &engines.folders;

    match &args.command {
        FolderCommand::Create { name, parent } => {
            let folder = folders
                .create_folder(
                    ctx,
                    CreateFolderRequest {
                        name: name.clone(),
                        parent_id: *parent,
                        metadata: None,
                    },
                )
                .await?;
            output::print_success(&format!("Folder '{}' created (id: {})", folder.path, folder.id));
        }
        FolderCommand::Rename { id, name } => {
            let folder = folders.rename_folder(ctx, *id, name).await?;
            output::print_success(&format!("Folder renamed to '{}'", folder.path));
        }
        FolderCommand::Move { id, to } => {
            let target = parse_folder_target(Some(to))?;
            let folder = folders.move_folder(ctx, *id, target).await?;
            output::print_success(&format!(
                "Folder moved to '{}' (depth {})",
                folder.path, folder.depth
            ));
        }
        FolderCommand::Delete { id } => {
            let summary = folders.soft_delete_folder(ctx, *id).await?;
            output::print_success(&format!(
                "Moved {} folder(s) and {} document(s) to the trash",
                summary.folders, summary.documents
            ));
        }
        FolderCommand::Restore { id } => {
            let folder = folders.restore_folder(ctx, *id).await?;
            output::print_success(&format!("Folder '{}' restored", folder.path));
        }
        FolderCommand::Purge { id } => {
            let summary = folders.permanent_delete_folder(ctx, *id).await?;
            output::print_success(&format!(
                "Removed {} folder(s); {} document(s) moved to the root level",
                summary.folders_removed, summary.documents_detached
            ));
        }
        FolderCommand::Show { id } => {
            let counts = folders.get_folder_with_counts(ctx, *id).await?;
            match format {
                OutputFormat::Json => output::print_json(&counts),
                OutputFormat::Table => {
                    output::print_kv("ID", &counts.folder.id.to_string());
                    output::print_kv("Path", &counts.folder.path);
                    output::print_kv("Depth", &counts.folder.depth.to_string());
                    output::print_kv("Subfolders", &counts.subfolder_count.to_string());
                    output::print_kv("Documents", &counts.document_count.to_string());
                    output::print_kv("Created", &counts.folder.created_at.to_rfc3339());
                    output::print_kv("Updated", &counts.folder.updated_at.to_rfc3339());
                }
            }
        }
        FolderCommand::List {
            parent,
            root,
            search,
            page,
            page_size,
        } => {
            let scope = match (parent, root) {
                (Some(id), _) => FolderScope::Children(*id),
                (None, true) => FolderScope::Root,
                (None, false) => FolderScope::All,
            };
            let query = FolderQuery {
                scope,
                search: search.clone(),
                ..FolderQuery::default()
            };
            let result = folders
                .list_folders(ctx, &query, PageRequest::new(*page, *page_size))
                .await?;
            print_folders(&result.items, format);
            output::print_page_footer(result.page, result.total_pages, result.total_items, format);
        }
        FolderCommand::Trash { page, page_size } => {
            let result = folders
                .list_trash_folders(ctx, PageRequest::new(*page, *page_size))
                .await?;
            print_folders(&result.items, format);
            output::print_page_footer(result.page, result.total_pages, result.total_items, format);
        }
        FolderCommand::Tree { from } => {
            let root_id = parse_folder_target(from.as_deref())?;
            let tree = engines.tree.get_folder_tree(ctx, root_id).await?;
            match format {
                OutputFormat::Json => output::print_json(&tree),
                OutputFormat::Table => {
                    println!("/");
                    print_tree(&tree.roots, "");
                    println!("{} folder(s)", tree.total_folders);
                }
            }
        }
        FolderCommand::Breadcrumbs { id } => {
            let trail = engines.tree.get_breadcrumbs(ctx, *id).await?;
            match format {
                OutputFormat::Json => output::print_json(&trail),
                OutputFormat::Table => {
                    let names: Vec<&str> = trail.iter().map(|b| b.name.as_str()).collect();
                    println!("/ > {}", names.join(" > "));
                }
            }
        }
    }

    Ok(())
}
