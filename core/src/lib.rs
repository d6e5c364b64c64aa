//! frame-ingest-core
//!
//! Marker-framed telemetry stream ingestion: TCP receive, frame assembly,
//! best-effort field extraction and idempotent upsert into a record sink.
//! No CLI, no logging setup; the binary owns both.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

pub mod journal;
pub mod sink;
pub mod telemetry;

// Stream layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::journal::{AsyncJournal, JournalEntry};
    pub use crate::sink::{LogSink, MemorySink, RecordSink, SinkError, SqliteSink, SqliteSinkConfig, UpsertOutcome};
    pub use crate::stream::extract::{DecodedRecord, ExtractConfig, FieldDecodeAnomaly};
    pub use crate::stream::framing::{Frame, FrameAssembler, FramingAnomaly, RetainPolicy};
    pub use crate::stream::{ingest_stream, shutdown_channel, IngestConfig, IngestSession, InputSource, ShutdownHandle};
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{ConfigError, IngestError, TransportError};
}
