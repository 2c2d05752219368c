use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        // Folders
        .route("/folders", get(handlers::list_folders))
        .route("/folders", post(handlers::create_folder))
        .route("/folders/:id", get(handlers::get_folder))
        .route("/folders/:id", delete(handlers::delete_folder))
        // Sheets (global search + per-sheet operations)
        .route("/sheets", get(handlers::list_sheets))
        .route("/sheets/:id", put(handlers::rename_sheet))
        .route("/sheets/:id", delete(handlers::delete_sheet))
        // Import flow
        .route("/import", post(handlers::import_sheet))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
