//! Scenario tests for the document lifecycle engine.

mod common;

use bytes::Bytes;
use uuid::Uuid;

use common::{TestEngines, assert_tree_consistent};
use docstore_core::config::{FolderConfig, StorageConfig};
use docstore_core::error::{ErrorKind, codes};
use docstore_core::traits::ObjectStorage;
use docstore_core::types::PageRequest;
use docstore_entity::document::{DocumentQuery, DocumentScope};
use docstore_service::DocumentService;
use docstore_service::document::{
    RegisterUploadRequest, UpdateDocumentRequest, UploadDocumentRequest,
};

const CONTENT_LEN: i64 = b"%PDF-1.7 test content".len() as i64;

#[tokio::test]
async fn test_upload_stores_content_and_charges_quota() {
    let app = TestEngines::new();
    let folder = app.folder("Docs", None).await;
    let doc = app.document("Report.PDF", Some(&folder)).await;

    assert_eq!(doc.folder_id, Some(folder.id));
    assert_eq!(doc.size_bytes, CONTENT_LEN);
    assert_eq!(doc.extension.as_deref(), Some("pdf"));
    assert_eq!(doc.mime_type, "application/pdf");
    assert_eq!(doc.version, 1);
    assert!(doc.storage_key.starts_with(&format!("{}/", app.ctx.owner_id)));
    assert!(app.storage.exists(&doc.storage_key).await.unwrap());
    assert_eq!(app.used_bytes().await, CONTENT_LEN);

    let (_, data) = app.documents.download(&app.ctx, doc.id).await.unwrap();
    assert_eq!(&data[..], b"%PDF-1.7 test content");
}

#[tokio::test]
async fn test_upload_rejects_oversized_content() {
    let app = TestEngines::with_config(
        FolderConfig::default(),
        StorageConfig {
            max_upload_size_bytes: 4,
            ..StorageConfig::default()
        },
    );
    let err = app
        .documents
        .upload(
            &app.ctx,
            UploadDocumentRequest {
                name: "big.bin".to_string(),
                data: Bytes::from_static(b"12345"),
                ..UploadDocumentRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.has_code(codes::UPLOAD_TOO_LARGE));
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_upload_rejects_when_quota_is_exhausted() {
    let app = TestEngines::new();
    app.quota.set_total(app.ctx.owner_id, CONTENT_LEN - 1);

    let err = app
        .documents
        .upload(
            &app.ctx,
            UploadDocumentRequest {
                name: "a.pdf".to_string(),
                data: Bytes::from_static(b"%PDF-1.7 test content"),
                ..UploadDocumentRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.has_code(codes::QUOTA_EXCEEDED));
    assert!(app.storage.is_empty().await);
    assert_eq!(app.used_bytes().await, 0);
}

#[tokio::test]
async fn test_upload_into_trashed_folder_fails() {
    let app = TestEngines::new();
    let folder = app.folder("Old", None).await;
    app.folders.soft_delete_folder(&app.ctx, folder.id).await.unwrap();

    let err = app
        .documents
        .upload(
            &app.ctx,
            UploadDocumentRequest {
                name: "late.pdf".to_string(),
                folder_id: Some(folder.id),
                data: Bytes::from_static(b"x"),
                ..UploadDocumentRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_update_bumps_version() {
    let app = TestEngines::new();
    let doc = app.document("draft.txt", None).await;

    let updated = app
        .documents
        .update_document(
            &app.ctx,
            doc.id,
            UpdateDocumentRequest {
                name: Some("final.txt".to_string()),
                tags: Some(vec![" q1 ".to_string(), "q1".to_string(), "finance".to_string()]),
                metadata: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "final.txt");
    assert_eq!(updated.original_name, "draft.txt");
    assert_eq!(updated.tags, ["q1", "finance"]);
    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn test_move_and_copy() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("B", None).await;
    let doc = app.document("plan.pdf", Some(&a)).await;

    let moved = app
        .documents
        .move_document(&app.ctx, doc.id, Some(b.id))
        .await
        .unwrap();
    assert_eq!(moved.folder_id, Some(b.id));

    let copy = app
        .documents
        .copy_document(&app.ctx, doc.id, None)
        .await
        .unwrap();
    assert_ne!(copy.id, doc.id);
    assert_ne!(copy.storage_key, doc.storage_key);
    assert_eq!(copy.folder_id, None);
    assert_eq!(app.storage.len().await, 2);
    assert_eq!(app.used_bytes().await, 2 * CONTENT_LEN);

    let err = app
        .documents
        .move_document(&app.ctx, doc.id, Some(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
}

#[tokio::test]
async fn test_listing_by_scope_and_tag() {
    let app = TestEngines::new();
    let folder = app.folder("Inbox", None).await;
    app.document("one.pdf", Some(&folder)).await;
    let tagged = app.document("two.pdf", None).await;
    app.documents
        .update_document(
            &app.ctx,
            tagged.id,
            UpdateDocumentRequest {
                tags: Some(vec!["urgent".to_string()]),
                ..UpdateDocumentRequest::default()
            },
        )
        .await
        .unwrap();

    let in_folder = app
        .documents
        .list_documents(
            &app.ctx,
            &DocumentQuery {
                scope: DocumentScope::Folder(folder.id),
                ..DocumentQuery::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(in_folder.total_items, 1);

    let at_root = app
        .documents
        .list_documents(
            &app.ctx,
            &DocumentQuery {
                scope: DocumentScope::Root,
                tag: Some("urgent".to_string()),
                ..DocumentQuery::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(at_root.items.len(), 1);
    assert_eq!(at_root.items[0].id, tagged.id);
}

#[tokio::test]
async fn test_soft_delete_records_folder_snapshot() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let year = app.folder("2024", Some(&docs)).await;
    let doc = app.document("report.pdf", Some(&year)).await;
    let loose = app.document("loose.pdf", None).await;

    let deleted = app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    assert!(deleted.is_deleted);
    let info = deleted.deleted_folder_info.unwrap();
    assert_eq!(info.folder_id, year.id);
    assert_eq!(info.path, "/Docs/2024");
    assert_eq!(info.parent_id, Some(docs.id));

    let deleted = app.documents.soft_delete(&app.ctx, loose.id).await.unwrap();
    assert!(deleted.deleted_folder_info.is_none());

    let trash = app
        .documents
        .list_trash(&app.ctx, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(trash.total_items, 2);

    // Already in the trash.
    let err = app.documents.soft_delete(&app.ctx, doc.id).await.unwrap_err();
    assert!(err.has_code(codes::DOCUMENT_NOT_FOUND));
}

#[tokio::test]
async fn test_restore_into_surviving_folder() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let doc = app.document("report.pdf", Some(&docs)).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();

    let outcome = app.documents.restore(&app.ctx, doc.id, true).await.unwrap();
    assert_eq!(outcome.document.folder_id, Some(docs.id));
    assert!(!outcome.folder_recreated);
    assert!(!outcome.document.is_deleted);
    assert!(outcome.document.deleted_folder_info.is_none());
    assert_eq!(app.all_folders().await.len(), 1);
}

#[tokio::test]
async fn test_restore_before_trashed_folder_reappears_with_it() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let doc = app.document("report.pdf", Some(&docs)).await;
    app.folders.soft_delete_folder(&app.ctx, docs.id).await.unwrap();

    let outcome = app.documents.restore(&app.ctx, doc.id, true).await.unwrap();
    assert_eq!(outcome.document.folder_id, Some(docs.id));
    assert!(!outcome.folder_recreated);
    // No stand-in /Docs was created.
    assert_eq!(app.all_folders().await.len(), 1);

    app.folders.restore_folder(&app.ctx, docs.id).await.unwrap();
    let listed = app
        .documents
        .list_documents(
            &app.ctx,
            &DocumentQuery {
                scope: DocumentScope::Folder(docs.id),
                ..DocumentQuery::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, doc.id);
}

#[tokio::test]
async fn test_restore_after_folder_purge_recreates_it() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let doc = app.document("report.pdf", Some(&docs)).await;
    app.folders.soft_delete_folder(&app.ctx, docs.id).await.unwrap();
    app.folders
        .permanent_delete_folder(&app.ctx, docs.id)
        .await
        .unwrap();

    let outcome = app.documents.restore(&app.ctx, doc.id, true).await.unwrap();
    assert!(outcome.folder_recreated);
    let recreated = app.folder_at("/Docs").await.unwrap();
    assert_ne!(recreated.id, docs.id);
    assert_eq!(recreated.depth, 0);
    assert_eq!(outcome.document.folder_id, Some(recreated.id));
}

#[tokio::test]
async fn test_restore_rebuilds_chain_reusing_existing_prefix() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let doc = app.document("report.pdf", Some(&b)).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    app.folders
        .permanent_delete_folder(&app.ctx, b.id)
        .await
        .unwrap();

    let outcome = app.documents.restore(&app.ctx, doc.id, true).await.unwrap();
    assert!(outcome.folder_recreated);

    let new_b = app.folder_at("/A/B").await.unwrap();
    assert_eq!(new_b.parent_id, Some(a.id));
    assert_eq!(new_b.depth, 1);
    assert_eq!(outcome.document.folder_id, Some(new_b.id));
    assert_eq!(app.all_folders().await.len(), 2);
    assert_tree_consistent(&app.all_folders().await);
}

#[tokio::test]
async fn test_restore_rebuilds_whole_chain() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let doc = app.document("report.pdf", Some(&b)).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    app.folders
        .permanent_delete_folder(&app.ctx, a.id)
        .await
        .unwrap();
    assert!(app.all_folders().await.is_empty());

    let outcome = app.documents.restore(&app.ctx, doc.id, true).await.unwrap();
    assert!(outcome.folder_recreated);
    let new_a = app.folder_at("/A").await.unwrap();
    let new_b = app.folder_at("/A/B").await.unwrap();
    assert_eq!(new_b.parent_id, Some(new_a.id));
    assert_eq!(outcome.document.folder_id, Some(new_b.id));
}

#[tokio::test]
async fn test_recreation_reuses_differently_cased_folder() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let doc = app.document("report.pdf", Some(&docs)).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    app.folders
        .permanent_delete_folder(&app.ctx, docs.id)
        .await
        .unwrap();
    let lower = app.folder("docs", None).await;

    let outcome = app.documents.restore(&app.ctx, doc.id, true).await.unwrap();
    assert!(!outcome.folder_recreated);
    assert_eq!(outcome.document.folder_id, Some(lower.id));
    assert_eq!(app.all_folders().await.len(), 1);
}

#[tokio::test]
async fn test_restore_without_recreation_goes_to_root() {
    let app = TestEngines::new();
    let docs = app.folder("Docs", None).await;
    let doc = app.document("report.pdf", Some(&docs)).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    app.folders
        .permanent_delete_folder(&app.ctx, docs.id)
        .await
        .unwrap();

    let outcome = app.documents.restore(&app.ctx, doc.id, false).await.unwrap();
    assert_eq!(outcome.document.folder_id, None);
    assert!(!outcome.folder_recreated);
    assert!(app.all_folders().await.is_empty());
}

#[tokio::test]
async fn test_failed_recreation_falls_back_to_root() {
    let app = TestEngines::new();
    let a = app.folder("A", None).await;
    let b = app.folder("B", Some(&a)).await;
    let doc = app.document("deep.pdf", Some(&b)).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    app.folders
        .permanent_delete_folder(&app.ctx, a.id)
        .await
        .unwrap();

    // Same stores, but the limit has since shrunk below the old chain.
    let strict = DocumentService::new(
        app.document_store.clone(),
        app.folder_store.clone(),
        app.storage.clone(),
        app.quota.clone(),
        StorageConfig::default(),
        FolderConfig {
            max_depth: 1,
            ..FolderConfig::default()
        },
    );
    let outcome = strict.restore(&app.ctx, doc.id, true).await.unwrap();
    assert_eq!(outcome.document.folder_id, None);
    assert!(!outcome.folder_recreated);
    assert!(!outcome.document.is_deleted);
}

#[tokio::test]
async fn test_permanent_delete_releases_quota() {
    let app = TestEngines::new();
    let doc = app.document("gone.pdf", None).await;
    app.documents.soft_delete(&app.ctx, doc.id).await.unwrap();
    assert_eq!(app.used_bytes().await, CONTENT_LEN);

    app.documents.permanent_delete(&app.ctx, doc.id).await.unwrap();
    assert!(app.reload_document(doc.id).await.is_none());
    assert!(app.storage.is_empty().await);
    assert_eq!(app.used_bytes().await, 0);
}

#[tokio::test]
async fn test_permanent_delete_tolerates_missing_object() {
    let app = TestEngines::new();
    let doc = app.document("orphan.pdf", None).await;
    app.storage.delete(&doc.storage_key).await.unwrap();

    app.documents.permanent_delete(&app.ctx, doc.id).await.unwrap();
    assert!(app.reload_document(doc.id).await.is_none());
}

#[tokio::test]
async fn test_presigned_upload_flow() {
    let app = TestEngines::new();
    let folder = app.folder("Scans", None).await;

    let reserved = app
        .documents
        .upload_url(&app.ctx, "scan.png", None)
        .await
        .unwrap();
    assert_eq!(reserved.url.method, "PUT");
    app.storage
        .upload(&reserved.storage_key, Bytes::from_static(b"png"), Some("image/png"))
        .await
        .unwrap();

    let doc = app
        .documents
        .register_upload(
            &app.ctx,
            RegisterUploadRequest {
                storage_key: reserved.storage_key.clone(),
                name: "scan.png".to_string(),
                folder_id: Some(folder.id),
                ..RegisterUploadRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(doc.storage_key, reserved.storage_key);
    assert_eq!(doc.size_bytes, 3);
    assert_eq!(doc.mime_type, "image/png");
    assert_eq!(app.used_bytes().await, 3);

    let url = app.documents.download_url(&app.ctx, doc.id).await.unwrap();
    assert_eq!(url.method, "GET");
}

/// Reserves a presigned key and puts `content` behind it.
async fn put_reserved(app: &TestEngines, name: &str, content: &'static [u8]) -> String {
    let reserved = app
        .documents
        .upload_url(&app.ctx, name, None)
        .await
        .unwrap();
    app.storage
        .upload(&reserved.storage_key, Bytes::from_static(content), None)
        .await
        .unwrap();
    reserved.storage_key
}

fn register(storage_key: &str, name: &str) -> RegisterUploadRequest {
    RegisterUploadRequest {
        storage_key: storage_key.to_string(),
        name: name.to_string(),
        ..RegisterUploadRequest::default()
    }
}

#[tokio::test]
async fn test_register_twice_keeps_first_document_content() {
    let app = TestEngines::new();
    let key = put_reserved(&app, "scan.png", b"png").await;

    let first = app
        .documents
        .register_upload(&app.ctx, register(&key, "scan.png"))
        .await
        .unwrap();
    let err = app
        .documents
        .register_upload(&app.ctx, register(&key, "scan-again.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(err.has_code(codes::DOCUMENT_EXISTS));

    let (doc, bytes) = app.documents.download(&app.ctx, first.id).await.unwrap();
    assert_eq!(doc.id, first.id);
    assert_eq!(&bytes[..], b"png");
    assert_eq!(app.used_bytes().await, 3);
}

#[tokio::test]
async fn test_register_oversized_object_is_removed() {
    let app = TestEngines::with_config(
        FolderConfig::default(),
        StorageConfig {
            max_upload_size_bytes: 2,
            ..StorageConfig::default()
        },
    );
    let key = put_reserved(&app, "scan.png", b"png").await;

    let err = app
        .documents
        .register_upload(&app.ctx, register(&key, "scan.png"))
        .await
        .unwrap_err();
    assert!(err.has_code(codes::UPLOAD_TOO_LARGE));
    assert!(!app.storage.exists(&key).await.unwrap());
    assert_eq!(app.used_bytes().await, 0);
}

#[tokio::test]
async fn test_register_over_quota_leaves_object() {
    let app = TestEngines::new();
    app.quota.set_total(app.ctx.owner_id, 2);
    let key = put_reserved(&app, "scan.png", b"png").await;

    let err = app
        .documents
        .register_upload(&app.ctx, register(&key, "scan.png"))
        .await
        .unwrap_err();
    assert!(err.has_code(codes::QUOTA_EXCEEDED));
    assert!(app.storage.exists(&key).await.unwrap());
    assert_eq!(app.used_bytes().await, 0);
}

#[tokio::test]
async fn test_register_into_missing_folder_leaves_object() {
    let app = TestEngines::new();
    let key = put_reserved(&app, "scan.png", b"png").await;

    let err = app
        .documents
        .register_upload(
            &app.ctx,
            RegisterUploadRequest {
                folder_id: Some(Uuid::new_v4()),
                ..register(&key, "scan.png")
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.has_code(codes::FOLDER_NOT_FOUND));
    assert!(app.storage.exists(&key).await.unwrap());
    assert_eq!(app.used_bytes().await, 0);
}

#[tokio::test]
async fn test_register_rejects_foreign_key() {
    let app = TestEngines::new();
    let other = app.other_owner();
    let reserved = app
        .documents
        .upload_url(&other, "theirs.pdf", None)
        .await
        .unwrap();

    let err = app
        .documents
        .register_upload(
            &app.ctx,
            RegisterUploadRequest {
                storage_key: reserved.storage_key,
                name: "mine.pdf".to_string(),
                ..RegisterUploadRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_documents_are_owner_scoped() {
    let app = TestEngines::new();
    let doc = app.document("private.pdf", None).await;
    let other = app.other_owner();

    let err = app.documents.get_document(&other, doc.id).await.unwrap_err();
    assert!(err.has_code(codes::DOCUMENT_NOT_FOUND));
    let err = app.documents.permanent_delete(&other, doc.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
