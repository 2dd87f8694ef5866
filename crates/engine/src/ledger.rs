//! Run ledger and snapshot publication.
//!
//! The orchestrator owns the only mutable ledger. Observers receive owned,
//! fully formed snapshots after every state change and can hold on to them
//! without synchronizing with the run.

use std::sync::mpsc::Sender;

use docdiff_core::{DiffItem, ProcessingState, SheetDiffResult, SheetStatus};
use serde::Serialize;

/// Point-in-time copy of the ledger.
///
/// `results` always has one entry per distinct sheet name, in processing
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub results: Vec<SheetDiffResult>,
    pub progress: ProcessingState,
}

impl LedgerSnapshot {
    pub fn count(&self, status: SheetStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    pub fn is_finished(&self) -> bool {
        self.results.iter().all(|r| r.status.is_terminal())
    }
}

/// Receives a snapshot after every ledger change.
pub trait LedgerObserver {
    fn publish(&mut self, snapshot: &LedgerSnapshot);
}

impl<F> LedgerObserver for F
where
    F: FnMut(&LedgerSnapshot),
{
    fn publish(&mut self, snapshot: &LedgerSnapshot) {
        self(snapshot)
    }
}

/// Discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LedgerObserver for NoopObserver {
    fn publish(&mut self, _snapshot: &LedgerSnapshot) {}
}

/// Forwards snapshots to another thread (typically a presentation loop).
///
/// A dropped receiver is not an error: the run continues unobserved.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<LedgerSnapshot>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<LedgerSnapshot>) -> Self {
        Self { tx }
    }
}

impl LedgerObserver for ChannelObserver {
    fn publish(&mut self, snapshot: &LedgerSnapshot) {
        if self.tx.send(snapshot.clone()).is_err() {
            log::debug!("ledger receiver dropped; snapshot discarded");
        }
    }
}

/// Mutable run state. Never leaves the engine.
pub(crate) struct Ledger {
    entries: Vec<SheetDiffResult>,
    progress: ProcessingState,
}

impl Ledger {
    pub(crate) fn new(sheet_names: &[String]) -> Self {
        Self {
            entries: sheet_names.iter().map(SheetDiffResult::pending).collect(),
            progress: ProcessingState {
                total_sheets: sheet_names.len(),
                processed_sheets: 0,
                current_sheet_name: String::new(),
            },
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn status(&self, idx: usize) -> SheetStatus {
        self.entries[idx].status
    }

    pub(crate) fn begin(&mut self, idx: usize) {
        self.transition(idx, SheetStatus::Processing);
        self.progress.current_sheet_name = self.entries[idx].sheet_name.clone();
    }

    pub(crate) fn complete(&mut self, idx: usize, diffs: Vec<DiffItem>, summary: String) {
        self.transition(idx, SheetStatus::Completed);
        let entry = &mut self.entries[idx];
        entry.diffs = diffs;
        entry.summary = Some(summary);
        self.progress.processed_sheets += 1;
    }

    pub(crate) fn fail(&mut self, idx: usize, message: String) {
        self.transition(idx, SheetStatus::Error);
        self.entries[idx].error = Some(message);
        self.progress.processed_sheets += 1;
    }

    /// Mark every sheet that never started as SKIPPED. Returns how many.
    pub(crate) fn skip_pending(&mut self) -> usize {
        let pending: Vec<usize> = (0..self.entries.len())
            .filter(|&idx| self.entries[idx].status == SheetStatus::Pending)
            .collect();
        for &idx in &pending {
            self.transition(idx, SheetStatus::Skipped);
        }
        self.progress.current_sheet_name.clear();
        pending.len()
    }

    pub(crate) fn clear_current(&mut self) {
        self.progress.current_sheet_name.clear();
    }

    pub(crate) fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            results: self.entries.clone(),
            progress: self.progress.clone(),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<SheetDiffResult>, ProcessingState) {
        (self.entries, self.progress)
    }

    fn transition(&mut self, idx: usize, next: SheetStatus) {
        let entry = &mut self.entries[idx];
        debug_assert!(
            entry.status.can_transition_to(next),
            "illegal transition for '{}': {:?} -> {:?}",
            entry.sheet_name,
            entry.status,
            next
        );
        log::debug!(
            "sheet '{}': {} -> {}",
            entry.sheet_name,
            entry.status.as_str(),
            next.as_str()
        );
        entry.status = next;
    }
}
