use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::repo_error;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend};
use crate::search::{self, KindFilter};
use crate::storage::models::{SheetKind, SheetRecord};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SheetResponse {
    pub id: String,
    pub name: String,
    pub kind: SheetKind,
    pub uri: String,
    pub folder_id: String,
    /// Resolved for display; orphaned sheets get the fallback label.
    pub folder_name: String,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListSheetsParams {
    #[serde(default)]
    pub kind: KindFilter,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameSheetRequest {
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_sheets(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListSheetsParams>,
) -> Result<Json<JSend<Vec<SheetResponse>>>, ApiError> {
    let sheets = state.repo.sheets().await;
    let folders = state.repo.folders().await;

    let items: Vec<SheetResponse> = search::filter_sheets(&sheets, &folders, params.kind, &params.q)
        .iter()
        .map(|s| sheet_to_response(s, search::folder_label(&folders, &s.folder_id)))
        .collect();

    Ok(JSend::success(items))
}

pub async fn rename_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<RenameSheetRequest>,
) -> Result<Json<JSend<SheetResponse>>, ApiError> {
    let renamed = state
        .repo
        .rename_sheet(&id, &req.name)
        .await
        .map_err(repo_error)?;
    if !renamed {
        return Err(ApiError::not_found("Sheet not found"));
    }

    let sheet = state
        .repo
        .sheets()
        .await
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| ApiError::internal("Sheet not found after rename"))?;
    let folders = state.repo.folders().await;

    Ok(JSend::success(sheet_to_response(
        &sheet,
        search::folder_label(&folders, &sheet.folder_id),
    )))
}

pub async fn delete_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.repo.delete_sheet(&id).await.map_err(repo_error)?;
    if !deleted {
        return Err(ApiError::not_found("Sheet not found"));
    }

    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

pub(super) fn sheet_to_response(sheet: &SheetRecord, folder_name: String) -> SheetResponse {
    SheetResponse {
        id: sheet.id.clone(),
        name: sheet.name.clone(),
        kind: sheet.kind,
        uri: sheet.uri.clone(),
        folder_id: sheet.folder_id.clone(),
        folder_name,
        created_at: sheet.created_at,
    }
}
