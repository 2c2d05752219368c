use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sheetbox::blob_store::{BlobStore, BlobStoreError, LocalStore};
use sheetbox::storage::models::{SheetDraft, SheetKind};
use sheetbox::storage::{Repository, RepositoryError};

async fn test_repo(dir: &tempfile::TempDir) -> Repository {
    let store = LocalStore::new(dir.path()).unwrap();
    Repository::open(Arc::new(store)).await.unwrap()
}

fn sample_draft(name: &str, folder_id: &str) -> SheetDraft {
    SheetDraft {
        name: name.to_string(),
        kind: SheetKind::Image,
        uri: format!("file:///cache/{name}"),
        folder_id: folder_id.to_string(),
    }
}

// ============================================================================
// Folder operations
// ============================================================================

#[tokio::test]
async fn test_create_folder_trims_name() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("  Maths  ").await.unwrap();
    assert_eq!(folder.name, "Maths");
    assert_eq!(folder.file_count, 0);

    let folders = repo.folders().await;
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, folder.id);
}

#[tokio::test]
async fn test_create_folder_empty_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    assert!(matches!(
        repo.create_folder("").await,
        Err(RepositoryError::EmptyName)
    ));
    assert!(matches!(
        repo.create_folder("   ").await,
        Err(RepositoryError::EmptyName)
    ));
    assert!(repo.folders().await.is_empty());
}

#[tokio::test]
async fn test_delete_folder_orphans_sheets() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("History").await.unwrap();
    let sheet = repo
        .create_sheet(sample_draft("Revolution.pdf", &folder.id))
        .await
        .unwrap();

    assert!(repo.delete_folder(&folder.id).await.unwrap());

    // No cascade: the sheet survives with its dangling folder reference.
    assert!(repo.folders().await.is_empty());
    let sheets = repo.sheets().await;
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].id, sheet.id);
    assert_eq!(sheets[0].folder_id, folder.id);
}

#[tokio::test]
async fn test_delete_folder_unknown_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    assert!(!repo.delete_folder("nonexistent").await.unwrap());
}

// ============================================================================
// Sheet operations
// ============================================================================

#[tokio::test]
async fn test_create_sheet_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Physics").await.unwrap();
    let draft = SheetDraft {
        name: "Optics.pdf".to_string(),
        kind: SheetKind::Pdf,
        uri: "file:///cache/optics.pdf".to_string(),
        folder_id: folder.id.clone(),
    };
    let sheet = repo.create_sheet(draft).await.unwrap();

    let sheets = repo.sheets().await;
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].id, sheet.id);
    assert_eq!(sheets[0].name, "Optics.pdf");
    assert_eq!(sheets[0].kind, SheetKind::Pdf);
    assert_eq!(sheets[0].uri, "file:///cache/optics.pdf");
    assert_eq!(sheets[0].folder_id, folder.id);
}

#[tokio::test]
async fn test_sequential_saves_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Chemistry").await.unwrap();
    let first = repo
        .create_sheet(sample_draft("Acids", &folder.id))
        .await
        .unwrap();
    let second = repo
        .create_sheet(sample_draft("Bases", &folder.id))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    let sheets = repo.sheets().await;
    assert_eq!(sheets.len(), 2);
}

#[tokio::test]
async fn test_delete_sheet_removes_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Biology").await.unwrap();
    let keep_a = repo
        .create_sheet(sample_draft("Cells", &folder.id))
        .await
        .unwrap();
    let doomed = repo
        .create_sheet(sample_draft("Mitosis", &folder.id))
        .await
        .unwrap();
    let keep_b = repo
        .create_sheet(sample_draft("Genetics", &folder.id))
        .await
        .unwrap();

    assert!(repo.delete_sheet(&doomed.id).await.unwrap());

    let sheets = repo.sheets().await;
    assert_eq!(sheets.len(), 2);
    let a = sheets.iter().find(|s| s.id == keep_a.id).unwrap();
    let b = sheets.iter().find(|s| s.id == keep_b.id).unwrap();
    assert_eq!(a.name, keep_a.name);
    assert_eq!(a.uri, keep_a.uri);
    assert_eq!(a.created_at, keep_a.created_at);
    assert_eq!(b.name, keep_b.name);
    assert_eq!(b.uri, keep_b.uri);
    assert_eq!(b.created_at, keep_b.created_at);
}

#[tokio::test]
async fn test_delete_sheet_unknown_id_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Latin").await.unwrap();
    repo.create_sheet(sample_draft("Verbs", &folder.id))
        .await
        .unwrap();
    let revision = repo.revision().await;

    assert!(!repo.delete_sheet("nonexistent").await.unwrap());
    assert_eq!(repo.sheets().await.len(), 1);
    // No write, no revision bump for a no-op.
    assert_eq!(repo.revision().await, revision);
}

#[tokio::test]
async fn test_rename_sheet_updates_only_name() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Geography").await.unwrap();
    let original = repo
        .create_sheet(sample_draft("Rivers", &folder.id))
        .await
        .unwrap();

    assert!(repo.rename_sheet(&original.id, "  Deltas  ").await.unwrap());

    let sheets = repo.sheets().await;
    let renamed = sheets.iter().find(|s| s.id == original.id).unwrap();
    assert_eq!(renamed.name, "Deltas");
    assert_eq!(renamed.kind, original.kind);
    assert_eq!(renamed.uri, original.uri);
    assert_eq!(renamed.folder_id, original.folder_id);
    assert_eq!(renamed.created_at, original.created_at);
}

#[tokio::test]
async fn test_rename_sheet_unknown_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    assert!(!repo.rename_sheet("nonexistent", "New name").await.unwrap());
}

#[tokio::test]
async fn test_rename_sheet_empty_name_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Music").await.unwrap();
    let sheet = repo
        .create_sheet(sample_draft("Scales", &folder.id))
        .await
        .unwrap();

    assert!(matches!(
        repo.rename_sheet(&sheet.id, "   ").await,
        Err(RepositoryError::EmptyName)
    ));
    assert_eq!(repo.sheets().await[0].name, "Scales");
}

// ============================================================================
// Loading, reload, durability
// ============================================================================

#[tokio::test]
async fn test_absent_blobs_load_empty() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    assert!(repo.folders().await.is_empty());
    assert!(repo.sheets().await.is_empty());
}

#[tokio::test]
async fn test_blank_blob_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    store.put("folders", "").await.unwrap();

    let repo = Repository::open(Arc::new(store)).await.unwrap();
    assert!(repo.folders().await.is_empty());
}

#[tokio::test]
async fn test_corrupt_blob_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    store.put("files", "{definitely not an array").await.unwrap();

    let result = Repository::open(Arc::new(store)).await;
    assert!(matches!(result, Err(RepositoryError::Codec(_))));
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let folder_id = {
        let repo = test_repo(&dir).await;
        let folder = repo.create_folder("Spanish").await.unwrap();
        repo.create_sheet(sample_draft("Vocab", &folder.id))
            .await
            .unwrap();
        folder.id
    };

    let repo = test_repo(&dir).await;
    let folders = repo.folders().await;
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, folder_id);
    assert_eq!(repo.sheets().await.len(), 1);
}

#[tokio::test]
async fn test_reload_picks_up_external_writes() {
    let dir = tempfile::tempdir().unwrap();
    let repo_a = test_repo(&dir).await;
    let repo_b = test_repo(&dir).await;

    repo_a.create_folder("Written elsewhere").await.unwrap();
    assert!(repo_b.folders().await.is_empty());

    repo_b.reload().await.unwrap();
    assert_eq!(repo_b.folders().await.len(), 1);
}

#[tokio::test]
async fn test_legacy_blob_layout_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();
    store
        .put(
            "folders",
            r#"[{"id":"f1","name":"Maths","createdAt":100,"fileCount":7}]"#,
        )
        .await
        .unwrap();
    store
        .put(
            "files",
            r#"[{"id":"s1","name":"A.pdf","type":"pdf","uri":"file:///a.pdf","folderId":"f1","createdAt":100}]"#,
        )
        .await
        .unwrap();

    let repo = Repository::open(Arc::new(store)).await.unwrap();

    let folders = repo.folders().await;
    assert_eq!(folders[0].name, "Maths");
    // The advisory counter decodes but live counts ignore it.
    assert_eq!(folders[0].file_count, 7);
    assert_eq!(repo.sheet_count("f1").await, 1);

    let sheets = repo.sheets().await;
    assert_eq!(sheets[0].kind, SheetKind::Pdf);
    assert_eq!(sheets[0].folder_id, "f1");
}

// ============================================================================
// Write-failure and change-notification behavior
// ============================================================================

struct FlakyStore {
    inner: LocalStore,
    fail_puts: AtomicBool,
}

#[async_trait]
impl BlobStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BlobStoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), BlobStoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(BlobStoreError::Backend("injected write failure".to_string()));
        }
        self.inner.put(key, value).await
    }
}

#[tokio::test]
async fn test_failed_write_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FlakyStore {
        inner: LocalStore::new(dir.path()).unwrap(),
        fail_puts: AtomicBool::new(false),
    });
    let repo = Repository::open(Arc::clone(&store) as Arc<dyn BlobStore>)
        .await
        .unwrap();

    repo.create_folder("Kept").await.unwrap();

    store.fail_puts.store(true, Ordering::SeqCst);
    assert!(matches!(
        repo.create_folder("Lost").await,
        Err(RepositoryError::Store(_))
    ));

    // Memory never diverges from the blobs: the failed create is absent.
    let folders = repo.folders().await;
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].name, "Kept");

    store.fail_puts.store(false, Ordering::SeqCst);
    repo.reload().await.unwrap();
    assert_eq!(repo.folders().await.len(), 1);
}

#[tokio::test]
async fn test_subscribe_sees_revision_bump() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let mut rx = repo.subscribe();
    let before = *rx.borrow_and_update();

    repo.create_folder("Watched").await.unwrap();

    rx.changed().await.unwrap();
    assert!(*rx.borrow() > before);
}

// ============================================================================
// Purge
// ============================================================================

#[tokio::test]
async fn test_purge_all() {
    let dir = tempfile::tempdir().unwrap();
    let repo = test_repo(&dir).await;

    let folder = repo.create_folder("Doomed").await.unwrap();
    repo.create_sheet(sample_draft("One", &folder.id))
        .await
        .unwrap();
    repo.create_sheet(sample_draft("Two", &folder.id))
        .await
        .unwrap();

    let stats = repo.purge_all().await.unwrap();
    assert_eq!(stats.folders, 1);
    assert_eq!(stats.sheets, 2);

    assert!(repo.folders().await.is_empty());
    assert!(repo.sheets().await.is_empty());

    // Blobs are reset to empty arrays, not removed.
    let store = LocalStore::new(dir.path()).unwrap();
    assert_eq!(store.get("folders").await.unwrap().as_deref(), Some("[]"));
    assert_eq!(store.get("files").await.unwrap().as_deref(), Some("[]"));
}
