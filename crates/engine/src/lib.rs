//! `docdiff-engine` - the diff orchestrator.
//!
//! Drives one comparison run: builds the ledger from two workbook
//! snapshots, resolves what it can locally, sends the rest to a
//! [`docdiff_provider::DiffProvider`] one sheet at a time, and publishes a
//! [`LedgerSnapshot`] after every change.

pub mod cancel;
pub mod ledger;
pub mod messages;
pub mod orchestrator;

pub use cancel::CancelToken;
pub use ledger::{ChannelObserver, LedgerObserver, LedgerSnapshot, NoopObserver};
pub use messages::{messages, Messages};
pub use orchestrator::{run, sheet_order, RunOptions, RunReport};
