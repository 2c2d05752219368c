use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::repo_error;
use super::sheets::{sheet_to_response, SheetResponse};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::Folder;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Entry bound carried over from the folder-name input field; enforced here
/// at the presentation layer, not in the repository.
const MAX_FOLDER_NAME_LEN: usize = 50;

#[derive(Debug, Serialize)]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    /// Live count, recomputed from the sheet collection on every read.
    pub sheet_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FolderDetailResponse {
    pub folder: FolderResponse,
    pub sheets: Vec<SheetResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<FolderResponse>>>, ApiError> {
    let folders = state.repo.folders().await;
    let sheets = state.repo.sheets().await;

    let items = folders
        .iter()
        .map(|folder| {
            let count = sheets.iter().filter(|s| s.folder_id == folder.id).count();
            folder_to_response(folder, count)
        })
        .collect();

    Ok(JSend::success(items))
}

pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateFolderRequest>,
) -> Result<Json<JSend<FolderResponse>>, ApiError> {
    if req.name.trim().chars().count() > MAX_FOLDER_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Folder name must be at most {MAX_FOLDER_NAME_LEN} characters"
        )));
    }

    let folder = state.repo.create_folder(&req.name).await.map_err(repo_error)?;
    Ok(JSend::success(folder_to_response(&folder, 0)))
}

pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<FolderDetailResponse>>, ApiError> {
    let folder = state
        .repo
        .get_folder(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Folder not found"))?;

    let sheets = state.repo.sheets_in_folder(&id).await;
    let items: Vec<SheetResponse> = sheets
        .iter()
        .map(|s| sheet_to_response(s, folder.name.clone()))
        .collect();
    let count = items.len();

    Ok(JSend::success(FolderDetailResponse {
        folder: folder_to_response(&folder, count),
        sheets: items,
    }))
}

pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.repo.delete_folder(&id).await.map_err(repo_error)?;
    if !deleted {
        return Err(ApiError::not_found("Folder not found"));
    }

    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

fn folder_to_response(folder: &Folder, sheet_count: usize) -> FolderResponse {
    FolderResponse {
        id: folder.id.clone(),
        name: folder.name.clone(),
        created_at: folder.created_at,
        sheet_count,
    }
}
