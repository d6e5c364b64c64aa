//! Record sinks.
//!
//! The core only needs a synchronous `upsert(record)`; everything about the
//! store (schema, connection, retries) belongs to the implementation.
//!
//! - [`MemorySink`]: in-process map, reference semantics
//! - [`LogSink`]: no persistence, one log event per record
//! - [`SqliteSink`]: `vehicles` table keyed by identifier

pub mod types;
pub mod memory;
pub mod log;
pub mod sqlite;

pub use types::{RecordSink, SinkError, StoredVehicle, UpsertOutcome};
pub use memory::MemorySink;
pub use log::LogSink;
pub use sqlite::{SqliteSink, SqliteSinkConfig};
