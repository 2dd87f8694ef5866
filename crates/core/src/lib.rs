//! `docdiff-core` - shared data model.
//!
//! Workbook snapshots go in, per-sheet diff results come out. No IO, no
//! network, no presentation concerns.

pub mod diff;
pub mod language;
pub mod ledger;
pub mod workbook;

pub use diff::{ChangeAction, ChangeType, DiffItem, DiffPayload};
pub use language::{Language, UnknownLanguage};
pub use ledger::{ProcessingState, SheetDiffResult, SheetStatus};
pub use workbook::{SheetContent, WorkbookSnapshot};
