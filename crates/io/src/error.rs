use std::fmt;

/// Failure to turn an uploaded file into a workbook snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// File could not be read.
    Io(String),
    /// Bytes are not a recognizable spreadsheet.
    UnsupportedFormat(String),
    /// Spreadsheet container recognized but a sheet could not be read.
    Workbook(String),
    /// Delimited text could not be parsed.
    Csv(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::UnsupportedFormat(msg) => write!(f, "unsupported file format: {msg}"),
            Self::Workbook(msg) => write!(f, "failed to read workbook: {msg}"),
            Self::Csv(msg) => write!(f, "failed to parse CSV: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}
