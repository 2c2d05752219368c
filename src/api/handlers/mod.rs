mod admin;
mod folders;
mod import;
mod sheets;

use crate::api::response::ApiError;
use crate::storage::RepositoryError;

pub use admin::{admin_purge, health};
pub use folders::{create_folder, delete_folder, get_folder, list_folders};
pub use import::import_sheet;
pub use sheets::{delete_sheet, list_sheets, rename_sheet};

/// Map a RepositoryError to an ApiError
fn repo_error(e: RepositoryError) -> ApiError {
    match e {
        RepositoryError::EmptyName => ApiError::bad_request("Name must not be empty"),
        _ => ApiError::internal(e.to_string()),
    }
}
