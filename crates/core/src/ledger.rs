//! Per-sheet ledger entries and progress projection.
//!
//! The state machine itself is driven by `docdiff-engine`; this module only
//! defines which transitions are legal.

use serde::{Deserialize, Serialize};

use crate::diff::DiffItem;

/// Lifecycle of one sheet within a comparison run.
///
/// ```text
/// PENDING ──► PROCESSING ──► COMPLETED
///    │              └──────► ERROR
///    └──► SKIPPED  (run cancelled before the sheet started)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SheetStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Skipped,
}

impl SheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetStatus::Pending => "PENDING",
            SheetStatus::Processing => "PROCESSING",
            SheetStatus::Completed => "COMPLETED",
            SheetStatus::Error => "ERROR",
            SheetStatus::Skipped => "SKIPPED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SheetStatus::Completed | SheetStatus::Error | SheetStatus::Skipped)
    }

    pub fn can_transition_to(&self, next: SheetStatus) -> bool {
        matches!(
            (self, next),
            (SheetStatus::Pending, SheetStatus::Processing)
                | (SheetStatus::Pending, SheetStatus::Skipped)
                | (SheetStatus::Processing, SheetStatus::Completed)
                | (SheetStatus::Processing, SheetStatus::Error)
        )
    }
}

/// Result entry for one distinct sheet name across both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetDiffResult {
    pub sheet_name: String,
    pub status: SheetStatus,
    pub diffs: Vec<DiffItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SheetDiffResult {
    pub fn pending(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            status: SheetStatus::Pending,
            diffs: Vec::new(),
            summary: None,
            error: None,
        }
    }
}

/// Progress projection for presentation. Derived, not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    pub total_sheets: usize,
    pub processed_sheets: usize,
    pub current_sheet_name: String,
}
