use tracing::info;

use crate::sink::types::{RecordSink, SinkError, UpsertOutcome};
use crate::stream::extract::DecodedRecord;

/// Sink without persistence: one log event per decoded record.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn upsert(&mut self, record: &DecodedRecord) -> Result<UpsertOutcome, SinkError> {
        if record.is_empty() {
            return Ok(UpsertOutcome::Skipped);
        }
        info!(
            identifier = record.identifier.as_deref().unwrap_or("-"),
            make = record.make.as_deref().unwrap_or("-"),
            model = record.model.as_deref().unwrap_or("-"),
            color = record.color.as_deref().unwrap_or("-"),
            "[SINK] vehicle record"
        );
        Ok(UpsertOutcome::Emitted)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
