//! Scenario tests for the folder tree engine.

mod common;

use common::{TestEngines, assert_tree_consistent};
use docstore_core::config::{FolderConfig, StorageConfig};
use docstore_core::error::{ErrorKind, codes};
use docstore_core::types::PageRequest;
use docstore_database::store::FolderStore;
use docstore_service::folder::CreateFolderRequest;

#[tokio::test]
async fn test_create_computes_path_and_depth() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    let q1 = app.folder("Q1", Some(&year)).await;

    assert_eq!((docs.path.as_str(), docs.depth), ("/Docs", 0));
    assert_eq!((year.path.as_str(), year.depth), ("/Docs/2024", 1));
    assert_eq!((q1.path.as_str(), q1.depth), ("/Docs/2024/Q1", 2));
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_create_trims_and_validates_names() {
    let app = TestEngines::new();
    let folder = app.folder("  Reports  ", None).await;
    assert_eq!(folder.path, "/Reports");

    for bad in ["", "a/b", ".."] {
        let err = app
            .folders
            .create_folder(
                &app.ctx,
                CreateFolderRequest {
                    name: bad.to_string(),
                    ..CreateFolderRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.has_code(codes::FOLDER_NAME_INVALID), "{bad:?}");
    }
}

#[tokio::test]
async fn test_sibling_names_are_case_insensitive() {
    let app = TestEngines::new();
    let parent = app.folder("Projects", None).await;
    app.folder("Alpha", Some(&parent)).await;

    let err = app
        .folders
        .create_folder(
            &app.ctx,
            CreateFolderRequest {
                name: "ALPHA".to_string(),
                parent_id: Some(parent.id),
                metadata: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.has_code(codes::FOLDER_NAME_EXISTS));

    // Same name elsewhere, or for another owner, is fine.
    app.folder("alpha", None).await;
    let other = app.other_owner();
    app.folders
        .create_folder(
            &other,
            CreateFolderRequest {
                name: "Projects".to_string(),
                ..CreateFolderRequest::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deleted_sibling_does_not_block_name() {
    let app = TestEngines::new();
    let old = app.folder("Archive", None).await;
    app.folders.soft_delete_folder(&app.ctx, old.id).await.unwrap();

    let fresh = app.folder("archive", None).await;
    assert_ne!(fresh.id, old.id);

    // The trashed one can no longer come back under the same name.
    let err = app.folders.restore_folder(&app.ctx, old.id).await.unwrap_err();
    assert!(err.has_code(codes::FOLDER_NAME_EXISTS));
}

#[tokio::test]
async fn test_create_under_missing_parent_fails() {
    let app = TestEngines::new();
    let parent = app.folder("Private", None).await;

    let err = app
        .folders
        .create_folder(
            &app.other_owner(),
            CreateFolderRequest {
                name: "Sneaky".to_string(),
                parent_id: Some(parent.id),
                metadata: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_chain_of_51_fails_at_the_51st() {
    let app = TestEngines::new();
    let mut parent = app.folder("L0", None).await;
    for level in 1..50 {
        parent = app.folder(&format!("L{level}"), Some(&parent)).await;
    }
    assert_eq!(parent.depth, 49);

    let err = app
        .folders
        .create_folder(
            &app.ctx,
            CreateFolderRequest {
                name: "L50".to_string(),
                parent_id: Some(parent.id),
                metadata: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.has_code(codes::FOLDER_MAX_DEPTH_EXCEEDED));
}

#[tokio::test]
async fn test_rename_cascades_paths_not_depths() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    let q1 = app.folder("Q1", Some(&year)).await;
    let unrelated = app.folder("Docsity", None).await;

    let renamed = app
        .folders
        .rename_folder(&app.ctx, docs.id, "Papers")
        .await
        .unwrap();
    assert_eq!(renamed.path, "/Papers");
    assert_eq!(renamed.depth, 0);

    let year = app.reload_folder(year.id).await.unwrap();
    let q1 = app.reload_folder(q1.id).await.unwrap();
    assert_eq!((year.path.as_str(), year.depth), ("/Papers/2024", 1));
    assert_eq!((q1.path.as_str(), q1.depth), ("/Papers/2024/Q1", 2));

    let unrelated = app.reload_folder(unrelated.id).await.unwrap();
    assert_eq!(unrelated.path, "/Docsity");
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_rename_escapes_pattern_characters() {
    let app = TestEngines::new();
    let odd = app.folder("50%_off", None).await;
    let child = app.folder("deals", Some(&odd)).await;
    let lookalike = app.folder("50xxoff", None).await;
    let lookalike_child = app.folder("deals", Some(&lookalike)).await;

    app.folders.rename_folder(&app.ctx, odd.id, "sale").await.unwrap();

    assert_eq!(app.reload_folder(child.id).await.unwrap().path, "/sale/deals");
    assert_eq!(
        app.reload_folder(lookalike_child.id).await.unwrap().path,
        "/50xxoff/deals"
    );
}

#[tokio::test]
async fn test_rename_to_taken_name_conflicts() {
    let app = TestEngines::new();
    app.folder("Invoices", None).await;
    let other = app.folder("Receipts", None).await;

    let err = app
        .folders
        .rename_folder(&app.ctx, other.id, "invoices")
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NAME_EXISTS));

    // Changing only the case of its own name is allowed.
    let renamed = app
        .folders
        .rename_folder(&app.ctx, other.id, "RECEIPTS")
        .await
        .unwrap();
    assert_eq!(renamed.path, "/RECEIPTS");
}

#[tokio::test]
async fn test_move_docs_2024_to_root() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    let q1 = app.folder("Q1", Some(&year)).await;
    assert_eq!(q1.depth, 2);

    let moved = app.folders.move_folder(&app.ctx, year.id, None).await.unwrap();
    assert_eq!((moved.path.as_str(), moved.depth), ("/2024", 0));
    assert_eq!(moved.parent_id, None);

    let q1 = app.reload_folder(q1.id).await.unwrap();
    assert_eq!((q1.path.as_str(), q1.depth), ("/2024/Q1", 1));
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_move_shifts_subtree_depths() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("B", None).await;
    let c = app.folder("C", Some(&b)).await;
    let d = app.folder("D", Some(&c)).await;

    let moved = app.folders.move_folder(&app.ctx, b.id, Some(a.id)).await.unwrap();
    assert_eq!((moved.path.as_str(), moved.depth), ("/A/B", 1));

    let c = app.reload_folder(c.id).await.unwrap();
    let d = app.reload_folder(d.id).await.unwrap();
    assert_eq!((c.path.as_str(), c.depth), ("/A/B/C", 2));
    assert_eq!((d.path.as_str(), d.depth), ("/A/B/C/D", 3));
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_move_into_own_subtree_is_rejected() {
    let app = TestEngines::new();
    let top = app.folder("Top", None).await;
    let mid = app.folder("Mid", Some(&top)).await;
    let leaf = app.folder("Leaf", Some(&mid)).await;
    let before = app.all_folders().await;

    for target in [top.id, leaf.id] {
        let err = app
            .folders
            .move_folder(&app.ctx, top.id, Some(target))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.has_code(codes::FOLDER_MOVE_INTO_SELF));
    }

    let after = app.all_folders().await;
    let snapshot = |folders: &[docstore_entity::folder::Folder]| {
        let mut v: Vec<_> = folders
            .iter()
            .map(|f| (f.id, f.path.clone(), f.depth, f.parent_id))
            .collect();
        v.sort();
        v
    };
    assert_eq!(snapshot(&before), snapshot(&after));
}

#[tokio::test]
async fn test_move_to_unknown_target_is_not_found() {
    let app = TestEngines::new();
    let folder = app.folder("Loose", None).await;
    let err = app
        .folders
        .move_folder(&app.ctx, folder.id, Some(uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_move_respects_depth_of_deepest_descendant() {
    let app = TestEngines::with_config(
        FolderConfig {
            max_depth: 4,
            ..FolderConfig::default()
        },
        StorageConfig::default(),
    );
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let x = app.folder("X", None).await;
    let y = app.folder("Y", Some(&x)).await;
    app.folder("Z", Some(&y)).await;

    // X/Y/Z under A/B would put Z at depth 4.
    let err = app
        .folders
        .move_folder(&app.ctx, x.id, Some(b.id))
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_MAX_DEPTH_EXCEEDED));

    // Under A it ends at depth 3.
    app.folders.move_folder(&app.ctx, x.id, Some(a.id)).await.unwrap();
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_move_into_name_clash_conflicts() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    app.folder("Shared", Some(&a)).await;
    let shared = app.folder("shared", None).await;

    let err = app
        .folders
        .move_folder(&app.ctx, shared.id, Some(a.id))
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NAME_EXISTS));
}

#[tokio::test]
async fn test_soft_delete_cascades_to_subtree_and_documents() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    let outside = app.folder("Other", None).await;
    let d1 = app.document("a.pdf", Some(&docs)).await;
    let d2 = app.document("b.pdf", Some(&year)).await;
    let d3 = app.document("c.pdf", Some(&outside)).await;

    let summary = app.folders.soft_delete_folder(&app.ctx, docs.id).await.unwrap();
    assert_eq!(summary.folders, 2);
    assert_eq!(summary.documents, 2);

    assert!(app.reload_folder(docs.id).await.unwrap().is_deleted);
    assert!(app.reload_folder(year.id).await.unwrap().is_deleted);
    assert!(!app.reload_folder(outside.id).await.unwrap().is_deleted);
    assert!(app.reload_document(d1.id).await.unwrap().is_deleted);
    assert!(app.reload_document(d2.id).await.unwrap().is_deleted);
    assert!(!app.reload_document(d3.id).await.unwrap().is_deleted);

    // Deleted folders cannot be mutated.
    let err = app
        .folders
        .rename_folder(&app.ctx, docs.id, "Nope")
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_restore_only_restores_one_folder() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    app.folders.soft_delete_folder(&app.ctx, docs.id).await.unwrap();

    let err = app.folders.restore_folder(&app.ctx, year.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.has_code(codes::FOLDER_PARENT_DELETED));

    let restored = app.folders.restore_folder(&app.ctx, docs.id).await.unwrap();
    assert!(restored.is_active());
    assert!(app.reload_folder(year.id).await.unwrap().is_deleted);

    app.folders.restore_folder(&app.ctx, year.id).await.unwrap();
    assert!(!app.reload_folder(year.id).await.unwrap().is_deleted);

    // Restoring an active folder is a not-found.
    let err = app.folders.restore_folder(&app.ctx, docs.id).await.unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_permanent_delete_detaches_documents() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    let active = app.document("live.pdf", Some(&year)).await;
    let trashed = app.document("old.pdf", Some(&docs)).await;
    app.documents.soft_delete(&app.ctx, trashed.id).await.unwrap();

    let summary = app
        .folders
        .permanent_delete_folder(&app.ctx, docs.id)
        .await
        .unwrap();
    assert_eq!(summary.folders_removed, 2);
    assert_eq!(summary.documents_detached, 2);

    assert!(app.reload_folder(docs.id).await.is_none());
    assert!(app.reload_folder(year.id).await.is_none());

    let active = app.reload_document(active.id).await.unwrap();
    assert_eq!(active.folder_id, None);
    assert!(!active.is_deleted);
    let trashed = app.reload_document(trashed.id).await.unwrap();
    assert_eq!(trashed.folder_id, None);
    assert!(trashed.is_deleted);
}

#[tokio::test]
async fn test_permanent_delete_works_from_trash() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    app.folders.soft_delete_folder(&app.ctx, docs.id).await.unwrap();

    let summary = app
        .folders
        .permanent_delete_folder(&app.ctx, docs.id)
        .await
        .unwrap();
    assert_eq!(summary.folders_removed, 1);

    let err = app
        .folders
        .permanent_delete_folder(&app.ctx, docs.id)
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_listing_and_counts() {
    let app = TestEngines::new();
    let b = app.folder("beta", None).await;
    app.folder("Alpha", None).await;
    app.folder("child-1", Some(&b)).await;
    app.folder("child-2", Some(&b)).await;
    app.document("note.txt", Some(&b)).await;

    let roots = app
        .folders
        .get_root_folders(&app.ctx, PageRequest::default())
        .await
        .unwrap();
    let names: Vec<_> = roots.items.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["Alpha", "beta"]);

    let subs = app
        .folders
        .get_subfolders(&app.ctx, b.id, PageRequest::new(1, 1))
        .await
        .unwrap();
    assert_eq!(subs.total_items, 2);
    assert_eq!(subs.items.len(), 1);
    assert!(subs.has_next());

    let counts = app.folders.get_folder_with_counts(&app.ctx, b.id).await.unwrap();
    assert_eq!(counts.subfolder_count, 2);
    assert_eq!(counts.document_count, 1);
}

#[tokio::test]
async fn test_trash_listing() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    app.folder("A1", Some(&a)).await;
    app.folder("B", None).await;
    app.folders.soft_delete_folder(&app.ctx, a.id).await.unwrap();

    let trash = app
        .folders
        .list_trash_folders(&app.ctx, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(trash.total_items, 2);
    assert!(trash.items.iter().all(|f| f.is_deleted));
}

#[tokio::test]
async fn test_breadcrumbs_run_root_to_self() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let c = app.folder("C", Some(&b)).await;

    let crumbs = app.tree.get_breadcrumbs(&app.ctx, c.id).await.unwrap();
    let paths: Vec<_> = crumbs.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, ["/A", "/A/B", "/A/B/C"]);

    let single = app.tree.get_breadcrumbs(&app.ctx, a.id).await.unwrap();
    assert_eq!(single.len(), 1);
}

#[tokio::test]
async fn test_folder_tree_nests_active_folders() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("b", Some(&a)).await;
    app.folder("C", Some(&b)).await;
    let gone = app.folder("Gone", Some(&a)).await;
    app.folder("Z", None).await;
    app.document("x.pdf", Some(&b)).await;
    app.folders.soft_delete_folder(&app.ctx, gone.id).await.unwrap();

    let tree = app.tree.get_folder_tree(&app.ctx, None).await.unwrap();
    assert_eq!(tree.total_folders, 4);
    assert_eq!(tree.roots.len(), 2);
    assert_eq!(tree.roots[0].name, "A");
    assert_eq!(tree.roots[0].child_count, 1);
    let b_node = &tree.roots[0].children[0];
    assert_eq!(b_node.document_count, 1);
    assert_eq!(b_node.children[0].path, "/A/b/C");

    let sub = app.tree.get_folder_tree(&app.ctx, Some(b.id)).await.unwrap();
    assert_eq!(sub.total_folders, 2);
    assert_eq!(sub.roots[0].id, b.id);
}

#[tokio::test]
async fn test_other_owner_sees_nothing() {
    let app = TestEngines::new();
    let mine = app.folder("Mine", None).await;
    let other = app.other_owner();

    let err = app.folders.get_folder(&other, mine.id).await.unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
    let err = app
        .folders
        .soft_delete_folder(&other, mine.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let tree = app.tree.get_folder_tree(&other, None).await.unwrap();
    assert_eq!(tree.total_folders, 0);
    assert!(
        app.folder_store
            .find_by_path(other.owner_id, "/Mine")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_rename_and_move_leave_trashed_namesake_subtree_alone() {
    let app = TestEngines::new();
    let old_a = app.folder("A", None).await;
    let old_x = app.folder("X", Some(&old_a)).await;
    app.folders.soft_delete_folder(&app.ctx, old_a.id).await.unwrap();

    let new_a = app.folder("A", None).await;
    let child = app.folder("Y", Some(&new_a)).await;
    app.folders.rename_folder(&app.ctx, new_a.id, "B").await.unwrap();
    let parent = app.folder("P", None).await;
    app.folders
        .move_folder(&app.ctx, new_a.id, Some(parent.id))
        .await
        .unwrap();

    let old_x = app.reload_folder(old_x.id).await.unwrap();
    assert_eq!((old_x.path.as_str(), old_x.depth), ("/A/X", 1));
    let child = app.reload_folder(child.id).await.unwrap();
    assert_eq!((child.path.as_str(), child.depth), ("/P/B/Y", 2));
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_purge_leaves_trashed_namesake_subtree_alone() {
    let app = TestEngines::new();
    let old_a = app.folder("A", None).await;
    let old_x = app.folder("X", Some(&old_a)).await;
    let doc = app.document("notes.pdf", Some(&old_x)).await;
    app.folders.soft_delete_folder(&app.ctx, old_a.id).await.unwrap();

    let new_a = app.folder("A", None).await;
    let summary = app
        .folders
        .permanent_delete_folder(&app.ctx, new_a.id)
        .await
        .unwrap();
    assert_eq!(summary.folders_removed, 1);
    assert_eq!(summary.documents_detached, 0);

    assert!(app.reload_folder(old_x.id).await.is_some());
    let doc = app.reload_document(doc.id).await.unwrap();
    assert_eq!(doc.folder_id, Some(old_x.id));
    assert!(doc.is_deleted);
    assert_tree_consistent(&app.all_folders().await);
}
