use serde::{Deserialize, Serialize};

/// Classification of a revision sheet derived from its media type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    Image,
    Pdf,
}

impl SheetKind {
    /// Derive a sheet kind from a declared media type string.
    ///
    /// Anything that is not recognizably a PDF is an image; the import
    /// sources only ever produce those two.
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type.split('/').nth(1) {
            Some(sub) if sub.contains("pdf") => SheetKind::Pdf,
            _ => SheetKind::Image,
        }
    }
}

/// A user-created grouping of revision sheets.
///
/// Persisted as a JSON object with camelCase fields inside the `"folders"`
/// blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// Epoch milliseconds, set once at creation.
    pub created_at: i64,
    /// Advisory only. Live counts always come from filtering the sheet
    /// collection; this field is carried for blob compatibility and never
    /// trusted for display.
    #[serde(default)]
    pub file_count: u32,
}

/// An imported revision sheet record.
///
/// Persisted as a JSON object with camelCase fields inside the `"files"`
/// blob. `uri` is an opaque locator owned by the platform: stored verbatim,
/// never integrity-checked. `folder_id` is an unenforced reference; a sheet
/// whose folder is gone is an orphan, tolerated everywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SheetKind,
    pub uri: String,
    pub folder_id: String,
    /// Epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// An in-memory, not-yet-persisted sheet prior to id/timestamp assignment.
#[derive(Debug, Clone)]
pub struct SheetDraft {
    pub name: String,
    pub kind: SheetKind,
    pub uri: String,
    pub folder_id: String,
}
