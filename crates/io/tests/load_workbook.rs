// Integration tests for workbook loading.
// Fixtures are generated with rust_xlsxwriter so no binary files live in the repo.

use std::path::{Path, PathBuf};

use docdiff_io::{load_workbook, parse_workbook, LoadError};
use rust_xlsxwriter::Workbook;

fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("schema_v1.xlsx");
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Users").unwrap();
        sheet.write_string(0, 0, "column").unwrap();
        sheet.write_string(0, 1, "type").unwrap();
        sheet.write_string(0, 2, "length").unwrap();
        sheet.write_string(0, 3, "nullable").unwrap();
        sheet.write_string(1, 0, "email").unwrap();
        sheet.write_string(1, 1, "VARCHAR").unwrap();
        sheet.write_number(1, 2, 100.0).unwrap();
        sheet.write_boolean(1, 3, false).unwrap();
    }
    {
        // Data starts at B2
        let sheet = workbook.add_worksheet();
        sheet.set_name("Indexes").unwrap();
        sheet.write_string(1, 1, "idx_users_email").unwrap();
        sheet.write_number(1, 2, 1.5).unwrap();
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Empty").unwrap();
    }

    workbook.save(&path).unwrap();
    path
}

#[test]
fn xlsx_sheets_keep_tab_order() {
    let dir = tempfile::tempdir().unwrap();
    let wb = load_workbook(&write_fixture(dir.path())).unwrap();

    assert_eq!(wb.file_name, "schema_v1.xlsx");
    assert_eq!(wb.sheet_names().collect::<Vec<_>>(), vec!["Users", "Indexes", "Empty"]);
}

#[test]
fn xlsx_cells_render_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let wb = load_workbook(&write_fixture(dir.path())).unwrap();

    let users = wb.sheet("Users").unwrap();
    assert_eq!(users.csv, "column,type,length,nullable\nemail,VARCHAR,100,FALSE\n");
}

#[test]
fn xlsx_grid_is_anchored_at_a1() {
    let dir = tempfile::tempdir().unwrap();
    let wb = load_workbook(&write_fixture(dir.path())).unwrap();

    let indexes = wb.sheet("Indexes").unwrap();
    assert_eq!(indexes.row_count(), 2);
    assert_eq!(indexes.rows[1], vec!["", "idx_users_email", "1.5"]);
    assert_eq!(indexes.rows[0], vec!["", "", ""]);
}

#[test]
fn xlsx_empty_sheet_has_empty_csv() {
    let dir = tempfile::tempdir().unwrap();
    let wb = load_workbook(&write_fixture(dir.path())).unwrap();

    assert_eq!(wb.sheet("Empty").unwrap().csv, "");
}

#[test]
fn same_workbook_loads_to_same_fingerprints() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path());
    let a = load_workbook(&path).unwrap();
    let b = load_workbook(&path).unwrap();

    for (left, right) in a.sheets().iter().zip(b.sheets()) {
        assert_eq!(left.csv, right.csv);
        assert_eq!(left.fingerprint(), right.fingerprint());
    }
}

#[test]
fn csv_file_becomes_single_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("columns.csv");
    std::fs::write(&path, "table,column\nusers,id\n").unwrap();

    let wb = load_workbook(&path).unwrap();
    assert_eq!(wb.len(), 1);
    assert_eq!(wb.sheet("columns").unwrap().csv, "table,column\nusers,id\n");
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_workbook(&dir.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)), "{:?}", err);
}

#[test]
fn corrupt_spreadsheet_is_rejected() {
    let err = parse_workbook("broken.xlsx", b"PK\x03\x04 truncated".to_vec()).unwrap_err();
    assert!(
        matches!(err, LoadError::UnsupportedFormat(_) | LoadError::Workbook(_)),
        "{:?}",
        err
    );
}

#[test]
fn far_off_cell_counts_its_a1_padding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sparse.xlsx");
    let mut workbook = Workbook::new();
    // Used range is 1x1 but anchoring at A1 needs 3000 x 3000 cells
    workbook.add_worksheet().write_string(2999, 2999, "x").unwrap();
    workbook.save(&path).unwrap();

    let err = load_workbook(&path).unwrap_err();
    assert!(matches!(err, LoadError::Workbook(_)), "{:?}", err);
    assert!(err.to_string().contains("exceeds"), "{}", err);
}
