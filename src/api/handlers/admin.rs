use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub folders_deleted: u64,
    pub sheets_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state
        .repo
        .purge_all()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::warn!(
        folders = stats.folders,
        sheets = stats.sheets,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        folders_deleted: stats.folders,
        sheets_deleted: stats.sheets,
    }))
}
