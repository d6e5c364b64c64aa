// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters used while the ingest pipeline runs.
//!
//! Summary: Collects chunk, frame, field and sink outcome counts.
//! Converted into an immutable TelemetrySnapshot at pipeline end.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::sink::UpsertOutcome;
use crate::stream::extract::{DecodedRecord, FieldDecodeAnomaly};
use crate::stream::framing::FramingAnomaly;

/// Deterministic counters collected during stream processing
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub chunks_received: u64,
    pub bytes_received: u64,

    pub frames_emitted: u64,
    pub bytes_framed: u64,
    pub bytes_discarded: u64,
    pub framing_anomalies: u64,

    pub identifiers_extracted: u64,
    pub payloads_extracted: u64,
    pub frames_too_short: u64,
    pub blank_identifiers: u64,
    pub json_absent: u64,
    pub json_rejected: u64,

    pub records_inserted: u64,
    pub records_updated: u64,
    pub records_emitted: u64,
    pub records_skipped: u64,
    pub sink_failures: u64,
}

impl TelemetryCounters {
    /// Record one non-empty network read.
    pub fn add_chunk(&mut self, len: usize) {
        self.chunks_received += 1;
        self.bytes_received += len as u64;
    }

    /// Record one frame handed to the extractor.
    pub fn add_frame(&mut self, len: usize) {
        self.frames_emitted += 1;
        self.bytes_framed += len as u64;
    }

    pub fn add_framing_anomaly(&mut self, anomaly: &FramingAnomaly) {
        self.framing_anomalies += 1;
        self.bytes_discarded += anomaly.discarded() as u64;
    }

    /// Record which fields an extraction produced.
    pub fn add_record(&mut self, record: &DecodedRecord) {
        if record.identifier.is_some() {
            self.identifiers_extracted += 1;
        }
        if record.has_payload() {
            self.payloads_extracted += 1;
        }
    }

    pub fn add_field_anomaly(&mut self, anomaly: &FieldDecodeAnomaly) {
        match anomaly {
            FieldDecodeAnomaly::FrameTooShort { .. } => self.frames_too_short += 1,
            FieldDecodeAnomaly::BlankIdentifier => self.blank_identifiers += 1,
            FieldDecodeAnomaly::NoJsonCandidate => self.json_absent += 1,
            FieldDecodeAnomaly::MultipleOpenBraces { .. }
            | FieldDecodeAnomaly::UnclosedJson
            | FieldDecodeAnomaly::InvalidJson(_) => self.json_rejected += 1,
        }
    }

    pub fn add_upsert(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.records_inserted += 1,
            UpsertOutcome::Updated => self.records_updated += 1,
            UpsertOutcome::Emitted => self.records_emitted += 1,
            UpsertOutcome::Skipped => self.records_skipped += 1,
        }
    }

    pub fn add_sink_failure(&mut self) {
        self.sink_failures += 1;
    }

    /// Records the sink accepted (stored or emitted).
    pub fn records_delivered(&self) -> u64 {
        self.records_inserted + self.records_updated + self.records_emitted
    }

    // This avoids:
    // * locks inside the receiver and worker loops
    // * atomics
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.chunks_received += other.chunks_received;
        self.bytes_received += other.bytes_received;

        self.frames_emitted += other.frames_emitted;
        self.bytes_framed += other.bytes_framed;
        self.bytes_discarded += other.bytes_discarded;
        self.framing_anomalies += other.framing_anomalies;

        self.identifiers_extracted += other.identifiers_extracted;
        self.payloads_extracted += other.payloads_extracted;
        self.frames_too_short += other.frames_too_short;
        self.blank_identifiers += other.blank_identifiers;
        self.json_absent += other.json_absent;
        self.json_rejected += other.json_rejected;

        self.records_inserted += other.records_inserted;
        self.records_updated += other.records_updated;
        self.records_emitted += other.records_emitted;
        self.records_skipped += other.records_skipped;
        self.sink_failures += other.sink_failures;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
