//! The import flow: folder selection, asset acquisition, persistence.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::storage::models::{SheetDraft, SheetKind, SheetRecord};
use crate::storage::{Repository, RepositoryError};

/// Where an import acquires its asset from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Camera,
    Gallery,
    Document,
}

/// An asset handed over by a platform picker.
#[derive(Debug, Clone)]
pub struct PickedAsset {
    pub name: Option<String>,
    pub media_type: Option<String>,
    pub uri: String,
}

/// What a picker invocation produced.
#[derive(Debug, Clone)]
pub enum Acquisition {
    Asset(PickedAsset),
    Cancelled,
}

#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Picker failed: {0}")]
    Failed(String),
}

/// Seam for the platform camera/gallery/document pickers. Cancellation and
/// failure are the whole contract surface.
#[async_trait]
pub trait AssetPicker: Send + Sync {
    async fn pick(&self, source: ImportSource) -> Result<Acquisition, PickerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    SelectingFolder,
    Acquiring,
    Persisting,
}

#[derive(Debug)]
pub enum ImportOutcome {
    Imported(SheetRecord),
    /// The user backed out of the folder choice or the picker.
    Cancelled,
    /// Nothing to import into; the caller should create a folder first.
    NoFolders,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("An import is already in progress")]
    Busy,
    #[error("Picker error: {0}")]
    Picker(#[from] PickerError),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// The import state machine: Idle -> SelectingFolder -> Acquiring ->
/// Persisting -> Idle.
///
/// While a run is in any non-Idle state, new runs are rejected outright (no
/// queuing). Every exit path -- cancellation, failure, success -- restores
/// Idle.
pub struct ImportFlow {
    repo: Arc<Repository>,
    state: Mutex<FlowState>,
}

impl ImportFlow {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            state: Mutex::new(FlowState::Idle),
        }
    }

    pub fn state(&self) -> FlowState {
        *self.lock_state()
    }

    /// Drive one import run to completion. The picker is invoked at most
    /// once, only after a folder has been chosen.
    pub async fn run(
        &self,
        source: ImportSource,
        folder_id: Option<String>,
        picker: &dyn AssetPicker,
    ) -> Result<ImportOutcome, ImportError> {
        self.begin()?;
        let _reset = IdleGuard(self);

        // SelectingFolder: nothing to choose from ends the run with guidance.
        if self.repo.folders().await.is_empty() {
            tracing::debug!("Import requested with no folders");
            return Ok(ImportOutcome::NoFolders);
        }
        let folder_id = match folder_id {
            Some(id) => id,
            None => return Ok(ImportOutcome::Cancelled),
        };

        self.set_state(FlowState::Acquiring);
        let asset = match picker.pick(source).await {
            Ok(Acquisition::Asset(asset)) => asset,
            Ok(Acquisition::Cancelled) => return Ok(ImportOutcome::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "Asset acquisition failed");
                return Err(e.into());
            }
        };

        self.set_state(FlowState::Persisting);
        let draft = draft_from_asset(source, asset, folder_id);
        let sheet = self.repo.create_sheet(draft).await?;
        tracing::debug!(sheet_id = %sheet.id, "Imported sheet");
        Ok(ImportOutcome::Imported(sheet))
    }

    fn begin(&self) -> Result<(), ImportError> {
        let mut state = self.lock_state();
        if *state != FlowState::Idle {
            return Err(ImportError::Busy);
        }
        *state = FlowState::SelectingFolder;
        Ok(())
    }

    fn set_state(&self, next: FlowState) {
        *self.lock_state() = next;
    }

    fn lock_state(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Restores Idle on every exit path out of a run.
struct IdleGuard<'a>(&'a ImportFlow);

impl Drop for IdleGuard<'_> {
    fn drop(&mut self) {
        self.0.set_state(FlowState::Idle);
    }
}

/// Build a sheet draft from a picked asset.
///
/// Camera and gallery assets are always images. Document assets classify by
/// their declared media type, then by a guess from the file name, defaulting
/// to image.
fn draft_from_asset(source: ImportSource, asset: PickedAsset, folder_id: String) -> SheetDraft {
    let kind = match source {
        ImportSource::Camera | ImportSource::Gallery => SheetKind::Image,
        ImportSource::Document => {
            let media_type = asset.media_type.clone().or_else(|| {
                asset
                    .name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(str::to_string)
            });
            media_type
                .map(|m| SheetKind::from_media_type(&m))
                .unwrap_or(SheetKind::Image)
        }
    };

    let name = asset.name.unwrap_or_else(|| default_name(source));
    SheetDraft {
        name,
        kind,
        uri: asset.uri,
        folder_id,
    }
}

fn default_name(source: ImportSource) -> String {
    let ts = Utc::now().timestamp_millis();
    match source {
        ImportSource::Camera => format!("Photo_{ts}.jpg"),
        ImportSource::Gallery => format!("Image_{ts}.jpg"),
        ImportSource::Document => format!("Document_{ts}"),
    }
}
