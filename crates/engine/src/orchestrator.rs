// Diff orchestration
//
// Sheets are matched by exact name and processed one at a time. Added,
// removed and byte-identical sheets are resolved locally; everything else is
// one blocking backend call. A failing sheet never stops the run.

use docdiff_core::{
    ChangeAction, ChangeType, DiffItem, Language, ProcessingState, SheetDiffResult, SheetStatus,
    WorkbookSnapshot,
};
use docdiff_provider::{CompareRequest, DiffProvider};
use serde::Serialize;

use crate::cancel::CancelToken;
use crate::ledger::{Ledger, LedgerObserver};
use crate::messages::messages;

/// Target used for synthesized whole-sheet items
pub const SHEET_TARGET: &str = "Sheet";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub language: Language,
    pub cancel: Option<CancelToken>,
}

/// Final state of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub old_file: String,
    pub new_file: String,
    pub provider: String,
    pub model: String,
    pub language: Language,
    pub results: Vec<SheetDiffResult>,
    pub progress: ProcessingState,
    /// Number of backend calls actually made
    pub backend_calls: usize,
    pub cancelled: bool,
    pub started_at: String,
    pub finished_at: String,
}

impl RunReport {
    pub fn count(&self, status: SheetStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(SheetStatus::Error) > 0
    }

    pub fn total_diffs(&self) -> usize {
        self.results.iter().map(|r| r.diffs.len()).sum()
    }
}

/// Names in processing order: old tab order, then names only in `new`.
pub fn sheet_order(old: &WorkbookSnapshot, new: &WorkbookSnapshot) -> Vec<String> {
    let mut names: Vec<String> = old.sheet_names().map(str::to_string).collect();
    for name in new.sheet_names() {
        if !old.contains(name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Compare two snapshots sheet by sheet.
///
/// The observer sees the initial all-PENDING ledger, then one snapshot per
/// transition. Returns once every sheet is terminal.
pub fn run(
    old: &WorkbookSnapshot,
    new: &WorkbookSnapshot,
    provider: &dyn DiffProvider,
    options: &RunOptions,
    observer: &mut dyn LedgerObserver,
) -> RunReport {
    let started_at = chrono::Utc::now().to_rfc3339();
    let text = messages(options.language);
    let names = sheet_order(old, new);

    log::info!(
        "comparing {} -> {}: {} sheet(s) via {} ({})",
        old.file_name,
        new.file_name,
        names.len(),
        provider.kind().name(),
        provider.model()
    );

    let mut ledger = Ledger::new(&names);
    observer.publish(&ledger.snapshot());

    let mut backend_calls = 0usize;
    let mut cancelled = false;

    for idx in 0..ledger.len() {
        if options.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            let skipped = ledger.skip_pending();
            log::info!("run cancelled; {} sheet(s) skipped", skipped);
            observer.publish(&ledger.snapshot());
            cancelled = true;
            break;
        }
        debug_assert_eq!(ledger.status(idx), SheetStatus::Pending);

        let name = names[idx].as_str();
        ledger.begin(idx);
        observer.publish(&ledger.snapshot());

        match (old.sheet(name), new.sheet(name)) {
            (None, Some(_)) => {
                let item = DiffItem::new(ChangeType::Other, ChangeAction::Added, SHEET_TARGET, text.sheet_added_desc);
                ledger.complete(idx, vec![item], text.sheet_added.to_string());
            }
            (Some(_), None) => {
                let item =
                    DiffItem::new(ChangeType::Other, ChangeAction::Removed, SHEET_TARGET, text.sheet_removed_desc);
                ledger.complete(idx, vec![item], text.sheet_removed.to_string());
            }
            (Some(old_sheet), Some(new_sheet)) if old_sheet.csv == new_sheet.csv => {
                ledger.complete(idx, Vec::new(), text.exact_match.to_string());
            }
            (Some(old_sheet), Some(new_sheet)) => {
                let request = CompareRequest {
                    sheet_name: name,
                    old_csv: &old_sheet.csv,
                    new_csv: &new_sheet.csv,
                    language: options.language,
                };
                backend_calls += 1;
                match provider.compare(&request) {
                    Ok(payload) => {
                        log::debug!("sheet '{}': {} change(s)", name, payload.diffs.len());
                        ledger.complete(idx, payload.diffs, payload.summary);
                    }
                    Err(err) => {
                        log::warn!("sheet '{}' failed: {}", name, err);
                        let message = err.to_string();
                        let message = if message.trim().is_empty() {
                            text.unknown_error.to_string()
                        } else {
                            message
                        };
                        ledger.fail(idx, message);
                    }
                }
            }
            // Every name comes from one of the two snapshots
            (None, None) => unreachable!("sheet '{}' in neither snapshot", name),
        }

        observer.publish(&ledger.snapshot());
    }

    if !cancelled {
        ledger.clear_current();
        observer.publish(&ledger.snapshot());
    }

    let (results, progress) = ledger.into_parts();
    let report = RunReport {
        old_file: old.file_name.clone(),
        new_file: new.file_name.clone(),
        provider: provider.kind().name().to_string(),
        model: provider.model().to_string(),
        language: options.language,
        results,
        progress,
        backend_calls,
        cancelled,
        started_at,
        finished_at: chrono::Utc::now().to_rfc3339(),
    };

    log::info!(
        "run finished: {} completed, {} error, {} skipped, {} backend call(s)",
        report.count(SheetStatus::Completed),
        report.count(SheetStatus::Error),
        report.count(SheetStatus::Skipped),
        report.backend_calls
    );
    report
}
