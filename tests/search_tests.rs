use sheetbox::search::{filter_sheets, folder_label, KindFilter, UNKNOWN_FOLDER_LABEL};
use sheetbox::storage::models::{Folder, SheetKind, SheetRecord};

fn folder(id: &str, name: &str) -> Folder {
    Folder {
        id: id.to_string(),
        name: name.to_string(),
        created_at: 0,
        file_count: 0,
    }
}

fn sheet(id: &str, name: &str, kind: SheetKind, folder_id: &str, created_at: i64) -> SheetRecord {
    SheetRecord {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        uri: format!("file:///cache/{id}"),
        folder_id: folder_id.to_string(),
        created_at,
    }
}

fn ids(sheets: &[SheetRecord]) -> Vec<&str> {
    sheets.iter().map(|s| s.id.as_str()).collect()
}

#[test]
fn test_kind_filter_narrows() {
    let folders = vec![folder("f1", "Maths")];
    let sheets = vec![
        sheet("1", "Scan", SheetKind::Image, "f1", 100),
        sheet("2", "Notes", SheetKind::Pdf, "f1", 200),
        sheet("3", "Diagram", SheetKind::Image, "f1", 300),
    ];

    let images = filter_sheets(&sheets, &folders, KindFilter::Image, "");
    assert_eq!(ids(&images), vec!["3", "1"]);

    let pdfs = filter_sheets(&sheets, &folders, KindFilter::Pdf, "");
    assert_eq!(ids(&pdfs), vec!["2"]);
}

#[test]
fn test_query_matches_name_case_insensitive() {
    let sheets = vec![sheet("1", "A.pdf", SheetKind::Pdf, "f1", 100)];
    let folders = vec![folder("f1", "Maths")];

    let results = filter_sheets(&sheets, &folders, KindFilter::All, "a");
    assert_eq!(ids(&results), vec!["1"]);
}

#[test]
fn test_query_matches_resolved_folder_name() {
    let folders = vec![folder("f1", "Maths"), folder("f2", "History")];
    let sheets = vec![
        sheet("1", "Scan 1", SheetKind::Image, "f1", 100),
        sheet("2", "Scan 2", SheetKind::Image, "f2", 200),
    ];

    let results = filter_sheets(&sheets, &folders, KindFilter::All, "math");
    assert_eq!(ids(&results), vec!["1"]);
}

#[test]
fn test_orphan_resolves_to_fallback_label() {
    assert_eq!(folder_label(&[], "ghost"), UNKNOWN_FOLDER_LABEL);

    // Orphans stay findable through the fallback label.
    let sheets = vec![sheet("1", "Stray", SheetKind::Image, "ghost", 100)];
    let results = filter_sheets(&sheets, &[], KindFilter::All, "unknown");
    assert_eq!(ids(&results), vec!["1"]);
}

#[test]
fn test_results_sorted_newest_first() {
    let folders = vec![folder("f1", "Maths")];
    let sheets = vec![
        sheet("old", "Scan", SheetKind::Image, "f1", 100),
        sheet("new", "Scan", SheetKind::Image, "f1", 300),
        sheet("mid", "Scan", SheetKind::Image, "f1", 200),
    ];

    let results = filter_sheets(&sheets, &folders, KindFilter::All, "");
    assert_eq!(ids(&results), vec!["new", "mid", "old"]);
}

#[test]
fn test_blank_query_keeps_everything() {
    let folders = vec![folder("f1", "Maths")];
    let sheets = vec![
        sheet("1", "Scan", SheetKind::Image, "f1", 100),
        sheet("2", "Notes", SheetKind::Pdf, "f1", 200),
    ];

    assert_eq!(filter_sheets(&sheets, &folders, KindFilter::All, "").len(), 2);
    assert_eq!(
        filter_sheets(&sheets, &folders, KindFilter::All, "   ").len(),
        2
    );
}

#[test]
fn test_no_match_yields_empty() {
    let folders = vec![folder("f1", "Maths")];
    let sheets = vec![sheet("1", "Scan", SheetKind::Image, "f1", 100)];

    assert!(filter_sheets(&sheets, &folders, KindFilter::All, "biology").is_empty());
}

#[test]
fn test_filtering_is_idempotent() {
    let folders = vec![folder("f1", "Maths"), folder("f2", "History")];
    let sheets = vec![
        sheet("1", "Algebra.pdf", SheetKind::Pdf, "f1", 100),
        sheet("2", "Dates", SheetKind::Image, "f2", 200),
        sheet("3", "Geometry", SheetKind::Pdf, "f1", 300),
    ];

    let once = filter_sheets(&sheets, &folders, KindFilter::Pdf, "ge");
    let twice = filter_sheets(&once, &folders, KindFilter::Pdf, "ge");
    assert_eq!(ids(&once), ids(&twice));
}
