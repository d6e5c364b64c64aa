use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::sink::types::{RecordSink, SinkError, StoredVehicle, UpsertOutcome};
use crate::stream::extract::DecodedRecord;

/// In-process store. Same upsert semantics as the SQLite sink.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: HashMap<String, StoredVehicle>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&StoredVehicle> {
        self.rows.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &StoredVehicle> {
        self.rows.values()
    }
}

impl RecordSink for MemorySink {
    fn upsert(&mut self, record: &DecodedRecord) -> Result<UpsertOutcome, SinkError> {
        let Some(identifier) = record.identifier.clone() else {
            debug!("[SINK] memory: record without identifier skipped");
            return Ok(UpsertOutcome::Skipped);
        };

        let row = StoredVehicle::from_record(identifier.clone(), record, Utc::now());
        match self.rows.insert(identifier, row) {
            None => Ok(UpsertOutcome::Inserted),
            Some(_) => Ok(UpsertOutcome::Updated),
        }
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
