use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{watch, RwLock};

use crate::blob_store::{BlobStore, BlobStoreError};

use super::codec::{self, CodecError};
use super::keys;
use super::models::{Folder, SheetDraft, SheetRecord};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("Storage error: {0}")]
    Store(#[from] BlobStoreError),
}

/// Statistics from a purge operation
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub folders: u64,
    pub sheets: u64,
}

#[derive(Default)]
struct State {
    folders: Vec<Folder>,
    sheets: Vec<SheetRecord>,
    revision: u64,
}

/// Single source of truth for the folder and sheet collections.
///
/// Every mutation takes the write lock, persists the full updated collection,
/// and only then commits it to memory -- a failed write leaves both memory
/// and the blob store unchanged. The lock serializes writers, so overlapping
/// mutations cannot drop each other's changes. Consumers that need to react
/// to changes watch the revision counter via [`Repository::subscribe`].
pub struct Repository {
    store: Arc<dyn BlobStore>,
    state: RwLock<State>,
    revision_tx: watch::Sender<u64>,
}

impl Repository {
    /// Open a repository over the given store and load both collections.
    ///
    /// Absent blobs load as empty collections; a present but malformed blob
    /// is corruption and fails the open.
    pub async fn open(store: Arc<dyn BlobStore>) -> Result<Self, RepositoryError> {
        let (revision_tx, _) = watch::channel(0);
        let repo = Self {
            store,
            state: RwLock::new(State::default()),
            revision_tx,
        };
        repo.reload().await?;
        Ok(repo)
    }

    /// Re-read both collections from the blob store, replacing memory state.
    pub async fn reload(&self) -> Result<(), RepositoryError> {
        let raw_folders = self.store.get(keys::FOLDERS).await?;
        let raw_sheets = self.store.get(keys::SHEETS).await?;
        let folders: Vec<Folder> = codec::decode(raw_folders.as_deref())?;
        let sheets: Vec<SheetRecord> = codec::decode(raw_sheets.as_deref())?;

        let mut state = self.state.write().await;
        state.folders = folders;
        state.sheets = sheets;
        self.bump(&mut state);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub async fn folders(&self) -> Vec<Folder> {
        self.state.read().await.folders.clone()
    }

    pub async fn sheets(&self) -> Vec<SheetRecord> {
        self.state.read().await.sheets.clone()
    }

    pub async fn get_folder(&self, id: &str) -> Option<Folder> {
        let state = self.state.read().await;
        state.folders.iter().find(|f| f.id == id).cloned()
    }

    /// Sheets belonging to a folder, newest first.
    pub async fn sheets_in_folder(&self, folder_id: &str) -> Vec<SheetRecord> {
        let state = self.state.read().await;
        let mut sheets: Vec<SheetRecord> = state
            .sheets
            .iter()
            .filter(|s| s.folder_id == folder_id)
            .cloned()
            .collect();
        sheets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sheets
    }

    /// Live sheet count for a folder. The persisted `fileCount` field is
    /// advisory and never consulted.
    pub async fn sheet_count(&self, folder_id: &str) -> usize {
        let state = self.state.read().await;
        state.sheets.iter().filter(|s| s.folder_id == folder_id).count()
    }

    pub async fn revision(&self) -> u64 {
        self.state.read().await.revision
    }

    /// Watch channel carrying the revision counter; bumped once per
    /// committed mutation and per reload.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    // ========================================================================
    // Folder operations
    // ========================================================================

    pub async fn create_folder(&self, name: &str) -> Result<Folder, RepositoryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepositoryError::EmptyName);
        }

        let folder = Folder {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now().timestamp_millis(),
            file_count: 0,
        };

        let mut state = self.state.write().await;
        let mut folders = state.folders.clone();
        folders.push(folder.clone());
        self.persist(keys::FOLDERS, &folders).await?;
        state.folders = folders;
        self.bump(&mut state);

        tracing::debug!(folder_id = %folder.id, "Created folder");
        Ok(folder)
    }

    /// Delete a folder. Its sheets are kept and become orphans: invisible
    /// from folder-scoped views, still visible in global search under the
    /// fallback folder label.
    pub async fn delete_folder(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.folders.iter().any(|f| f.id == id) {
            return Ok(false);
        }

        let folders: Vec<Folder> = state
            .folders
            .iter()
            .filter(|f| f.id != id)
            .cloned()
            .collect();
        self.persist(keys::FOLDERS, &folders).await?;
        state.folders = folders;
        let orphaned = state.sheets.iter().filter(|s| s.folder_id == id).count();
        self.bump(&mut state);

        tracing::debug!(folder_id = %id, orphaned, "Deleted folder");
        Ok(true)
    }

    // ========================================================================
    // Sheet operations
    // ========================================================================

    pub async fn create_sheet(&self, draft: SheetDraft) -> Result<SheetRecord, RepositoryError> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(RepositoryError::EmptyName);
        }

        let sheet = SheetRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            kind: draft.kind,
            uri: draft.uri,
            folder_id: draft.folder_id,
            created_at: Utc::now().timestamp_millis(),
        };

        let mut state = self.state.write().await;
        let mut sheets = state.sheets.clone();
        sheets.push(sheet.clone());
        self.persist(keys::SHEETS, &sheets).await?;
        state.sheets = sheets;
        self.bump(&mut state);

        tracing::debug!(sheet_id = %sheet.id, folder_id = %sheet.folder_id, "Created sheet");
        Ok(sheet)
    }

    /// Delete a sheet by id. An unknown id is a no-op: `false`, no write.
    pub async fn delete_sheet(&self, id: &str) -> Result<bool, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.sheets.iter().any(|s| s.id == id) {
            return Ok(false);
        }

        let sheets: Vec<SheetRecord> = state
            .sheets
            .iter()
            .filter(|s| s.id != id)
            .cloned()
            .collect();
        self.persist(keys::SHEETS, &sheets).await?;
        state.sheets = sheets;
        self.bump(&mut state);

        tracing::debug!(sheet_id = %id, "Deleted sheet");
        Ok(true)
    }

    /// Rename a sheet. Only `name` changes; every other field is untouched.
    pub async fn rename_sheet(&self, id: &str, new_name: &str) -> Result<bool, RepositoryError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(RepositoryError::EmptyName);
        }

        let mut state = self.state.write().await;
        if !state.sheets.iter().any(|s| s.id == id) {
            return Ok(false);
        }

        let sheets: Vec<SheetRecord> = state
            .sheets
            .iter()
            .map(|s| {
                if s.id == id {
                    let mut renamed = s.clone();
                    renamed.name = new_name.to_string();
                    renamed
                } else {
                    s.clone()
                }
            })
            .collect();
        self.persist(keys::SHEETS, &sheets).await?;
        state.sheets = sheets;
        self.bump(&mut state);

        tracing::debug!(sheet_id = %id, "Renamed sheet");
        Ok(true)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    /// Reset both collections to empty - for testing only
    pub async fn purge_all(&self) -> Result<PurgeStats, RepositoryError> {
        let mut state = self.state.write().await;
        let stats = PurgeStats {
            folders: state.folders.len() as u64,
            sheets: state.sheets.len() as u64,
        };

        self.persist::<Folder>(keys::FOLDERS, &[]).await?;
        self.persist::<SheetRecord>(keys::SHEETS, &[]).await?;
        state.folders.clear();
        state.sheets.clear();
        self.bump(&mut state);

        Ok(stats)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn persist<T: serde::Serialize>(
        &self,
        key: &'static str,
        items: &[T],
    ) -> Result<(), RepositoryError> {
        let raw = codec::encode(items)?;
        self.store.put(key, &raw).await?;
        Ok(())
    }

    fn bump(&self, state: &mut State) {
        state.revision += 1;
        self.revision_tx.send_replace(state.revision);
    }
}
