use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stream::extract::DecodedRecord;
use crate::stream::framing::{Frame, FramingAnomaly};

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    /// The sink rejected a record; the frame is kept for manual replay.
    SinkFailure {
        at: DateTime<Utc>,
        sink: String,
        error: String,
        record: DecodedRecord,
        frame_b64: String,
    },
    /// The assembler dropped bytes.
    FramingDiscard {
        at: DateTime<Utc>,
        reason: String,
        discarded: usize,
    },
    /// Pipeline lifecycle marker (start, stop).
    Lifecycle {
        at: DateTime<Utc>,
        message: String,
    },
}

impl JournalEntry {
    pub fn sink_failure(sink: &str, error: &impl ToString, record: &DecodedRecord, frame: &Frame) -> Self {
        JournalEntry::SinkFailure {
            at: Utc::now(),
            sink: sink.to_owned(),
            error: error.to_string(),
            record: record.clone(),
            frame_b64: STANDARD.encode(frame.as_bytes()),
        }
    }

    pub fn framing_discard(anomaly: &FramingAnomaly) -> Self {
        let reason = match anomaly {
            FramingAnomaly::NoMarker { .. } => "no_marker",
            FramingAnomaly::LeadingNoise { .. } => "leading_noise",
        };
        JournalEntry::FramingDiscard {
            at: Utc::now(),
            reason: reason.to_owned(),
            discarded: anomaly.discarded(),
        }
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        JournalEntry::Lifecycle {
            at: Utc::now(),
            message: message.into(),
        }
    }

    /// Raw frame bytes of a sink failure, for replay.
    pub fn frame_bytes(&self) -> Option<Vec<u8>> {
        match self {
            JournalEntry::SinkFailure { frame_b64, .. } => STANDARD.decode(frame_b64).ok(),
            _ => None,
        }
    }
}
