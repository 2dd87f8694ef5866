// Excel/ODS import (xlsx, xlsm, xlsb, xls, ods) via calamine

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use docdiff_core::{SheetContent, WorkbookSnapshot};

use crate::error::LoadError;

/// Maximum number of cells to import per workbook (prevents DoS from huge files)
const MAX_CELLS: usize = 5_000_000;

/// Parse spreadsheet bytes. Every sheet becomes a grid anchored at A1, in tab order.
pub fn parse_spreadsheet(file_name: &str, bytes: Vec<u8>) -> Result<WorkbookSnapshot, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| LoadError::UnsupportedFormat(format!("{}: {}", file_name, e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    let mut total_cells = 0usize;

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| LoadError::Workbook(format!("sheet '{}': {}", sheet_name, e)))?;

        let (height, width) = range.get_size();
        if height == 0 || width == 0 {
            log::debug!("sheet '{}' is empty", sheet_name);
            sheets.push(SheetContent::from_rows(sheet_name.clone(), Vec::new()));
            continue;
        }

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let start_row = start_row as usize;
        let start_col = start_col as usize;
        let full_width = start_col + width;

        // Count the A1 padding too: one far-off cell expands to the whole grid
        let anchored_cells = (start_row + height).saturating_mul(full_width);
        total_cells = total_cells.saturating_add(anchored_cells);
        if total_cells > MAX_CELLS {
            return Err(LoadError::Workbook(format!(
                "workbook exceeds {} cells (at sheet '{}')",
                MAX_CELLS, sheet_name
            )));
        }

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(start_row + height);
        for _ in 0..start_row {
            rows.push(vec![String::new(); full_width]);
        }
        for row in range.rows() {
            let mut cells = vec![String::new(); start_col];
            cells.extend(row.iter().map(render_cell));
            rows.push(cells);
        }

        log::debug!("sheet '{}': {}x{} from ({}, {})", sheet_name, height, width, start_row, start_col);
        sheets.push(SheetContent::from_rows(sheet_name.clone(), rows));
    }

    Ok(WorkbookSnapshot::new(file_name, sheets))
}

/// Render a cell as display text.
///
/// Integral floats drop their decimals, booleans become TRUE/FALSE, error
/// cells become `#ERR` and dates stay as serial numbers so that equal cells
/// always render equally.
pub fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => format!("{}", n),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(_) => "#ERR".to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
