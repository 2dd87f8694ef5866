// Workbook snapshots and canonical sheet serialization

use serde::Serialize;

/// One named tab of a workbook, with its canonical CSV fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetContent {
    pub name: String,
    /// Cell grid as rendered text, anchored at A1
    pub rows: Vec<Vec<String>>,
    /// Canonical serialization of `rows`. Equality of two sheets is decided on this.
    pub csv: String,
}

impl SheetContent {
    /// Build a sheet and compute its canonical CSV.
    ///
    /// Identical `rows` always produce byte-identical `csv`: fields are
    /// quoted only when necessary and every record ends with `\n`.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        let csv = canonical_csv(&rows);
        Self {
            name: name.into(),
            rows,
            csv,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the grid.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// blake3 hex digest of the canonical CSV (for display and logs).
    pub fn fingerprint(&self) -> String {
        blake3::hash(self.csv.as_bytes()).to_hex().to_string()
    }
}

fn canonical_csv(rows: &[Vec<String>]) -> String {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    for row in rows {
        writer
            .write_record(row)
            .expect("writing CSV to memory cannot fail");
    }

    let bytes = writer
        .into_inner()
        .expect("flushing CSV to memory cannot fail");
    // Input is UTF-8 and the writer only adds ASCII quoting
    String::from_utf8_lossy(&bytes).into_owned()
}

/// One parsed workbook file at a point in time. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbookSnapshot {
    pub file_name: String,
    sheets: Vec<SheetContent>,
}

impl WorkbookSnapshot {
    /// Sheets keep their tab order. A repeated name keeps its first occurrence.
    pub fn new(file_name: impl Into<String>, sheets: Vec<SheetContent>) -> Self {
        let mut unique: Vec<SheetContent> = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            if !unique.iter().any(|s| s.name == sheet.name) {
                unique.push(sheet);
            }
        }
        Self {
            file_name: file_name.into(),
            sheets: unique,
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn sheet(&self, name: &str) -> Option<&SheetContent> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    pub fn sheets(&self) -> &[SheetContent] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_canonical_csv_basic() {
        let sheet = SheetContent::from_rows("Users", grid(&[&["id", "name"], &["1", "alice"]]));
        assert_eq!(sheet.csv, "id,name\n1,alice\n");
    }

    #[test]
    fn test_canonical_csv_quotes_only_when_needed() {
        let sheet = SheetContent::from_rows("T", grid(&[&["a,b", "plain", "say \"hi\""]]));
        assert_eq!(sheet.csv, "\"a,b\",plain,\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn test_identical_rows_identical_csv() {
        let a = SheetContent::from_rows("A", grid(&[&["x", ""], &["", "y"]]));
        let b = SheetContent::from_rows("B", grid(&[&["x", ""], &["", "y"]]));
        assert_eq!(a.csv, b.csv);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_dimensions() {
        let sheet = SheetContent::from_rows("T", grid(&[&["a"], &["b", "c", "d"]]));
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.col_count(), 3);
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = SheetContent::from_rows("Empty", Vec::new());
        assert_eq!(sheet.csv, "");
        assert_eq!(sheet.col_count(), 0);
    }

    #[test]
    fn test_snapshot_lookup_is_case_sensitive() {
        let wb = WorkbookSnapshot::new("v1.xlsx", vec![SheetContent::from_rows("Users", Vec::new())]);
        assert!(wb.contains("Users"));
        assert!(!wb.contains("users"));
    }

    #[test]
    fn test_snapshot_keeps_first_duplicate() {
        let wb = WorkbookSnapshot::new(
            "v1.xlsx",
            vec![
                SheetContent::from_rows("A", grid(&[&["first"]])),
                SheetContent::from_rows("B", Vec::new()),
                SheetContent::from_rows("A", grid(&[&["second"]])),
            ],
        );
        assert_eq!(wb.len(), 2);
        assert_eq!(wb.sheet("A").unwrap().csv, "first\n");
        assert_eq!(wb.sheet_names().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
