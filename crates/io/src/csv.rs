// CSV/TSV import as a single-sheet workbook

use std::path::Path;

use docdiff_core::{SheetContent, WorkbookSnapshot};

use crate::error::LoadError;

/// Parse delimited text into a one-sheet snapshot named after the file stem.
pub fn parse_delimited(file_name: &str, bytes: &[u8], tab_separated: bool) -> Result<WorkbookSnapshot, LoadError> {
    let content = decode_text(bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = if tab_separated { b'\t' } else { sniff_delimiter(content) };

    let rows = read_rows(content, delimiter)?;
    let sheet_name = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());

    Ok(WorkbookSnapshot::new(
        file_name,
        vec![SheetContent::from_rows(sheet_name, rows)],
    ))
}

/// Decode as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs)
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Higher field count breaks ties
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn read_rows(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Csv(format!("row {}: {}", row_idx + 1, e)))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(rows)
}
