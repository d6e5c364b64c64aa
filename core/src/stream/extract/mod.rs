//! Field extraction from a complete frame.
//!
//! Two independent, best-effort lookups:
//! - the fixed-offset ASCII identifier
//! - a single JSON object in the frame's trailing window
//!
//! Neither lookup can fail the frame; misses are reported as
//! [`FieldDecodeAnomaly`] values and the record is forwarded regardless.

pub mod types;
pub mod identifier;
pub mod payload;

pub use types::{
    DecodedRecord,
    ExtractConfig,
    Extraction,
    FieldDecodeAnomaly,
    VehiclePayload,
};
pub use identifier::extract_identifier;
pub use payload::{decode_utf8_ignoring_invalid, extract_payload};

use crate::stream::framing::Frame;

/// Run both lookups and assemble the record handed to the sink.
pub fn extract_fields(frame: &Frame, cfg: &ExtractConfig) -> Extraction {
    let bytes = frame.as_bytes();
    let mut anomalies = Vec::new();

    let identifier = match extract_identifier(bytes, cfg) {
        Ok(id) => Some(id),
        Err(anomaly) => {
            anomalies.push(anomaly);
            None
        }
    };

    let payload = match extract_payload(bytes, cfg) {
        Ok(payload) => payload,
        Err(anomaly) => {
            anomalies.push(anomaly);
            VehiclePayload::default()
        }
    };

    Extraction {
        record: DecodedRecord {
            identifier,
            make: payload.make,
            model: payload.model,
            color: payload.color,
        },
        anomalies,
    }
}
