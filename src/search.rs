//! Search over a loaded sheet snapshot. Pure functions; callers re-run them
//! whenever the query, the filter, or the snapshot changes.

use serde::Deserialize;

use crate::storage::models::{Folder, SheetKind, SheetRecord};

/// Display label for sheets whose folder no longer exists.
pub const UNKNOWN_FOLDER_LABEL: &str = "Unknown folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Image,
    Pdf,
}

/// Resolve a folder name for display, falling back for orphaned sheets.
pub fn folder_label(folders: &[Folder], folder_id: &str) -> String {
    folders
        .iter()
        .find(|f| f.id == folder_id)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| UNKNOWN_FOLDER_LABEL.to_string())
}

/// Narrow a sheet snapshot by kind and free-text query, newest first.
///
/// The query matches case-insensitively as a substring of the sheet name or
/// of its resolved folder label, so orphaned sheets stay findable.
pub fn filter_sheets(
    sheets: &[SheetRecord],
    folders: &[Folder],
    filter: KindFilter,
    query: &str,
) -> Vec<SheetRecord> {
    let query = query.trim().to_lowercase();

    let mut filtered: Vec<SheetRecord> = sheets
        .iter()
        .filter(|sheet| matches_kind(sheet, filter))
        .filter(|sheet| {
            query.is_empty()
                || sheet.name.to_lowercase().contains(&query)
                || folder_label(folders, &sheet.folder_id)
                    .to_lowercase()
                    .contains(&query)
        })
        .cloned()
        .collect();

    filtered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    filtered
}

fn matches_kind(sheet: &SheetRecord, filter: KindFilter) -> bool {
    match filter {
        KindFilter::All => true,
        KindFilter::Image => sheet.kind == SheetKind::Image,
        KindFilter::Pdf => sheet.kind == SheetKind::Pdf,
    }
}
