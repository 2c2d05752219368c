use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::sheets::{sheet_to_response, SheetResponse};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::import::{
    Acquisition, AssetPicker, ImportError, ImportOutcome, ImportSource, PickedAsset, PickerError,
};
use crate::search;
use crate::storage::RepositoryError;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub source: ImportSource,
    /// Absent when the user backed out of the folder choice.
    #[serde(default)]
    pub folder_id: Option<String>,
    /// Absent when the user dismissed the picker.
    #[serde(default)]
    pub asset: Option<AssetPayload>,
}

#[derive(Debug, Deserialize)]
pub struct AssetPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    pub uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Imported,
    Cancelled,
    NoFolders,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub outcome: ImportStatus,
    pub sheet: Option<SheetResponse>,
    pub guidance: Option<String>,
}

/// One-shot picker backed by the request payload: the client already ran the
/// platform picker, so acquisition just hands its result over.
struct RequestPicker {
    payload: Mutex<Option<AssetPayload>>,
}

#[async_trait]
impl AssetPicker for RequestPicker {
    async fn pick(&self, _source: ImportSource) -> Result<Acquisition, PickerError> {
        let taken = self
            .payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        Ok(match taken {
            Some(asset) => Acquisition::Asset(PickedAsset {
                name: asset.name,
                media_type: asset.media_type,
                uri: asset.uri,
            }),
            None => Acquisition::Cancelled,
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn import_sheet(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ImportRequest>,
) -> Result<Json<JSend<ImportResponse>>, ApiError> {
    let picker = RequestPicker {
        payload: Mutex::new(req.asset),
    };

    let outcome = state
        .import
        .run(req.source, req.folder_id, &picker)
        .await
        .map_err(import_error)?;

    let response = match outcome {
        ImportOutcome::Imported(sheet) => {
            let folders = state.repo.folders().await;
            let folder_name = search::folder_label(&folders, &sheet.folder_id);
            ImportResponse {
                outcome: ImportStatus::Imported,
                sheet: Some(sheet_to_response(&sheet, folder_name)),
                guidance: None,
            }
        }
        ImportOutcome::Cancelled => ImportResponse {
            outcome: ImportStatus::Cancelled,
            sheet: None,
            guidance: None,
        },
        ImportOutcome::NoFolders => ImportResponse {
            outcome: ImportStatus::NoFolders,
            sheet: None,
            guidance: Some("Create a folder first".to_string()),
        },
    };

    Ok(JSend::success(response))
}

// ============================================================================
// Helpers
// ============================================================================

/// Map an ImportError to an ApiError
fn import_error(e: ImportError) -> ApiError {
    match e {
        ImportError::Busy => ApiError::conflict("An import is already in progress"),
        ImportError::Repository(RepositoryError::EmptyName) => {
            ApiError::bad_request("Name must not be empty")
        }
        _ => ApiError::internal(e.to_string()),
    }
}
