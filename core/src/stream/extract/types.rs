use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{IDENTIFIER_END, IDENTIFIER_START, JSON_WINDOW_LEN};
use crate::types::ConfigError;

/// Record forwarded to the sink. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRecord {
    pub identifier: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

impl DecodedRecord {
    pub fn with_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }

    pub fn has_payload(&self) -> bool {
        self.make.is_some() || self.model.is_some() || self.color.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.identifier.is_none() && !self.has_payload()
    }
}

/// String fields lifted out of the trailing JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePayload {
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
}

/// Frame layout used by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractConfig {
    /// First byte of the identifier field.
    pub identifier_start: usize,
    /// One past the last byte of the identifier field. Frames shorter than
    /// this carry no identifier.
    pub identifier_end: usize,
    /// Trailing bytes searched for the JSON payload.
    pub json_window: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            identifier_start: IDENTIFIER_START,
            identifier_end: IDENTIFIER_END,
            json_window: JSON_WINDOW_LEN,
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identifier_start >= self.identifier_end {
            return Err(ConfigError::IdentifierWindow {
                start: self.identifier_start,
                end: self.identifier_end,
            });
        }
        if self.json_window == 0 {
            return Err(ConfigError::JsonWindow);
        }
        Ok(())
    }
}

/// Why a field could not be taken from a frame. The frame is still forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDecodeAnomaly {
    /// Frame too short to hold the identifier field.
    FrameTooShort { len: usize },
    /// Identifier field empty or whitespace after trimming NULs.
    BlankIdentifier,
    /// No `{` in the trailing window.
    NoJsonCandidate,
    /// More than one `{` in the trailing window.
    MultipleOpenBraces { count: usize },
    /// A `{` with no `}` after it.
    UnclosedJson,
    /// Candidate text is not a JSON object.
    InvalidJson(String),
}

impl FieldDecodeAnomaly {
    /// Short stable label, used as a counter/journal key.
    pub fn label(&self) -> &'static str {
        match self {
            FieldDecodeAnomaly::FrameTooShort { .. } => "frame_too_short",
            FieldDecodeAnomaly::BlankIdentifier => "blank_identifier",
            FieldDecodeAnomaly::NoJsonCandidate => "no_json_candidate",
            FieldDecodeAnomaly::MultipleOpenBraces { .. } => "multiple_open_braces",
            FieldDecodeAnomaly::UnclosedJson => "unclosed_json",
            FieldDecodeAnomaly::InvalidJson(_) => "invalid_json",
        }
    }

    pub fn is_identifier_anomaly(&self) -> bool {
        matches!(
            self,
            FieldDecodeAnomaly::FrameTooShort { .. } | FieldDecodeAnomaly::BlankIdentifier
        )
    }
}

impl fmt::Display for FieldDecodeAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use FieldDecodeAnomaly::*;
        match self {
            FrameTooShort { len } => write!(f, "frame too short for identifier: {} bytes", len),
            BlankIdentifier => write!(f, "identifier field is blank"),
            NoJsonCandidate => write!(f, "no json object in trailing window"),
            MultipleOpenBraces { count } => write!(f, "{} opening braces in trailing window", count),
            UnclosedJson => write!(f, "json candidate has no closing brace"),
            InvalidJson(msg) => write!(f, "json candidate rejected: {}", msg),
        }
    }
}

/// Output of [`extract_fields`](super::extract_fields).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub record: DecodedRecord,
    pub anomalies: Vec<FieldDecodeAnomaly>,
}
