/// Folder collection: JSON array of Folder records
pub const FOLDERS: &str = "folders";

/// Sheet collection: JSON array of SheetRecord records. The blob layout
/// predates the "sheet" naming, so the key stays `files`.
pub const SHEETS: &str = "files";
