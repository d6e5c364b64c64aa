use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::stream::extract::DecodedRecord;

/// What the sink did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// First sighting of the identifier.
    Inserted,
    /// Identifier already present; fields and last-seen refreshed.
    Updated,
    /// Accepted by a sink that does not store records.
    Emitted,
    /// Nothing to key on (no identifier).
    Skipped,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored row for {identifier} is corrupt: {reason}")]
    Corrupt { identifier: String, reason: String },

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// A row as held by a persisting sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVehicle {
    pub identifier: String,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub last_seen: DateTime<Utc>,
}

impl StoredVehicle {
    pub fn from_record(identifier: String, record: &DecodedRecord, seen: DateTime<Utc>) -> Self {
        Self {
            identifier,
            make: record.make.clone(),
            model: record.model.clone(),
            color: record.color.clone(),
            last_seen: seen,
        }
    }
}

/// Synchronous, idempotent upsert keyed by identifier.
///
/// Repeated delivery of the same record must leave the store unchanged apart
/// from the last-seen timestamp. A failure is reported to the caller and must
/// not poison later calls.
pub trait RecordSink {
    fn upsert(&mut self, record: &DecodedRecord) -> Result<UpsertOutcome, SinkError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn upsert(&mut self, record: &DecodedRecord) -> Result<UpsertOutcome, SinkError> {
        (**self).upsert(record)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn upsert(&mut self, record: &DecodedRecord) -> Result<UpsertOutcome, SinkError> {
        (**self).upsert(record)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
