// Output rendering for compare and sheets.
//
// JSON output is a stable contract (schema_version 1). Text output is for
// humans and may change.

use std::io::{self, Write};

use docdiff_core::{SheetStatus, WorkbookSnapshot};
use docdiff_engine::{messages, LedgerSnapshot, RunReport};
use serde_json::{Map, Value};

pub const SCHEMA_VERSION: u32 = 1;

/// Report as a JSON object with `schema_version` first.
pub fn report_json(report: &RunReport) -> Result<Value, serde_json::Error> {
    let mut out = Map::new();
    out.insert("schema_version".to_string(), Value::from(SCHEMA_VERSION));
    if let Value::Object(fields) = serde_json::to_value(report)? {
        out.extend(fields);
    }
    Ok(Value::Object(out))
}

pub fn write_report_text(out: &mut impl Write, report: &RunReport) -> io::Result<()> {
    writeln!(
        out,
        "docdiff: {} -> {} ({}, {}, {})",
        report.old_file,
        report.new_file,
        report.provider,
        report.model,
        report.language.code()
    )?;

    // Labels follow the run's language; the JSON report keeps the wire names
    let text = messages(report.language);
    for result in &report.results {
        writeln!(out)?;
        writeln!(out, "[{}] {}", text.status_label(result.status), result.sheet_name)?;
        if let Some(summary) = &result.summary {
            writeln!(out, "  {}: {}", text.summary, summary)?;
        }
        if let Some(error) = &result.error {
            writeln!(out, "  {} {}", text.error_prefix, error)?;
        }
        for item in &result.diffs {
            write!(
                out,
                "  - {} {} {}: {}",
                text.type_label(item.change_type),
                text.action_label(item.action),
                item.target,
                item.description
            )?;
            match (&item.old_value, &item.new_value) {
                (Some(old), Some(new)) => writeln!(out, " ({} -> {})", old, new)?,
                (Some(old), None) => writeln!(out, " (was {})", old)?,
                (None, Some(new)) => writeln!(out, " (now {})", new)?,
                (None, None) => writeln!(out)?,
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", summary_line(report))
}

pub fn summary_line(report: &RunReport) -> String {
    let mut line = format!(
        "{} sheet{}: {} completed, {} error, {} skipped; {} change{}; {} backend call{}",
        report.results.len(),
        plural(report.results.len()),
        report.count(SheetStatus::Completed),
        report.count(SheetStatus::Error),
        report.count(SheetStatus::Skipped),
        report.total_diffs(),
        plural(report.total_diffs()),
        report.backend_calls,
        plural(report.backend_calls)
    );
    if report.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}

/// Progress line for the sheet in flight, if any.
pub fn progress_line(snapshot: &LedgerSnapshot) -> Option<String> {
    let progress = &snapshot.progress;
    if !progress.current_sheet_name.is_empty() {
        return Some(format!(
            "[{}/{}] {} ...",
            progress.processed_sheets + 1,
            progress.total_sheets,
            progress.current_sheet_name
        ));
    }
    None
}

pub fn sheets_json(workbook: &WorkbookSnapshot) -> Value {
    let sheets: Vec<Value> = workbook
        .sheets()
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "rows": s.row_count(),
                "cols": s.col_count(),
                "fingerprint": s.fingerprint(),
            })
        })
        .collect();

    serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "file": workbook.file_name,
        "sheets": sheets,
    })
}

pub fn write_sheets_text(out: &mut impl Write, workbook: &WorkbookSnapshot) -> io::Result<()> {
    let width = workbook.sheet_names().map(|n| n.chars().count()).max().unwrap_or(0).max(5);
    writeln!(out, "{:<width$}  {:>7}  {:>5}  fingerprint", "sheet", "rows", "cols", width = width)?;
    for sheet in workbook.sheets() {
        let fingerprint = sheet.fingerprint();
        writeln!(
            out,
            "{:<width$}  {:>7}  {:>5}  {}",
            sheet.name,
            sheet.row_count(),
            sheet.col_count(),
            &fingerprint[..16],
            width = width
        )?;
    }
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
