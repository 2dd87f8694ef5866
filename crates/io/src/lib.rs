// File I/O operations
//
// Every loader produces a `WorkbookSnapshot`; nothing downstream sees file
// formats, encodings or cell types.

pub mod csv;
pub mod error;
pub mod xlsx;

use std::path::Path;

use docdiff_core::WorkbookSnapshot;

pub use error::LoadError;

/// Extensions handled by the delimited-text loader
const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Load a workbook from disk. Format is chosen by extension.
pub fn load_workbook(path: &Path) -> Result<WorkbookSnapshot, LoadError> {
    let bytes = std::fs::read(path)
        .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    parse_workbook(&file_name, bytes)
}

/// Parse an uploaded file's bytes. `file_name` selects the format and names
/// the single sheet of delimited-text files.
pub fn parse_workbook(file_name: &str, bytes: Vec<u8>) -> Result<WorkbookSnapshot, LoadError> {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let snapshot = if TEXT_EXTENSIONS.contains(&extension.as_str()) {
        crate::csv::parse_delimited(file_name, &bytes, extension == "tsv")?
    } else {
        crate::xlsx::parse_spreadsheet(file_name, bytes)?
    };

    log::info!(
        "loaded {} ({} sheet{})",
        snapshot.file_name,
        snapshot.len(),
        if snapshot.len() == 1 { "" } else { "s" }
    );
    Ok(snapshot)
}
