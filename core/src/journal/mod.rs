//! Operator-facing anomaly journal.
//!
//! Append-only JSON lines written by a background thread, with size-based
//! rotation and zstd archival of rotated files.

pub mod entry;
pub mod writer;

pub use entry::JournalEntry;
pub use writer::{AsyncJournal, JournalError};
