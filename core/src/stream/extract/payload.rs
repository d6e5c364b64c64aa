use serde_json::{Map, Value};

use crate::constants::payload_fields;
use crate::stream::extract::types::{ExtractConfig, FieldDecodeAnomaly, VehiclePayload};

/// Look for a single JSON object in the frame's trailing window.
///
/// The window must contain exactly one `{`; the candidate runs from that
/// brace to the end of the window, must contain a `}` and must parse as an
/// object with nothing but whitespace after it.
pub fn extract_payload(frame: &[u8], cfg: &ExtractConfig) -> Result<VehiclePayload, FieldDecodeAnomaly> {
    let window = &frame[frame.len().saturating_sub(cfg.json_window)..];
    let text = decode_utf8_ignoring_invalid(window);

    let Some(open) = text.rfind('{') else {
        return Err(FieldDecodeAnomaly::NoJsonCandidate);
    };

    let count = text.matches('{').count();
    if count != 1 {
        return Err(FieldDecodeAnomaly::MultipleOpenBraces { count });
    }

    let candidate = &text[open..];
    if !candidate.contains('}') {
        return Err(FieldDecodeAnomaly::UnclosedJson);
    }

    let object: Map<String, Value> = serde_json::from_str(candidate)
        .map_err(|e| FieldDecodeAnomaly::InvalidJson(e.to_string()))?;

    Ok(VehiclePayload {
        make: string_field(&object, payload_fields::MAKE),
        model: string_field(&object, payload_fields::MODEL),
        color: string_field(&object, payload_fields::COLOR),
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Decode UTF-8, silently skipping invalid or truncated sequences.
pub fn decode_utf8_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                if let Ok(valid) = std::str::from_utf8(valid) {
                    out.push_str(valid);
                }
                match e.error_len() {
                    Some(skip) => bytes = &rest[skip..],
                    // truncated sequence at the end
                    None => return out,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_bytes_are_dropped() {
        assert_eq!(decode_utf8_ignoring_invalid(b"a\xffb\xc3"), "ab");
        assert_eq!(decode_utf8_ignoring_invalid("é{".as_bytes()), "é{");
    }

    #[test]
    fn trailing_binary_after_object_rejects_candidate() {
        let frame = b"\xbb\x0b\x00\x00....{\"model\":\"T\"}\x01\x02";
        assert!(matches!(
            extract_payload(frame, &ExtractConfig::default()),
            Err(FieldDecodeAnomaly::InvalidJson(_))
        ));
    }

    #[test]
    fn object_closing_the_window_is_read() {
        let frame = b"\xbb\x0b\x00\x00....{\"model\":\"T\"}";
        let p = extract_payload(frame, &ExtractConfig::default()).unwrap();
        assert_eq!(p.model.as_deref(), Some("T"));
        assert!(p.make.is_none());
    }
}
