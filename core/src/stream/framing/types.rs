use std::fmt;

use bytes::Bytes;

use crate::constants::MARKER_LEN;

/// One complete frame: the marker at its start through the byte before the
/// next marker occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// What the assembler keeps when a pass finds no marker at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetainPolicy {
    /// Keep only the last buffered byte. A marker split so that two or more
    /// of its bytes sit in the earlier chunk is lost.
    #[default]
    LastByte,
    /// Keep the last `MARKER_LEN - 1` bytes so any split marker survives.
    MarkerPrefix,
}

impl RetainPolicy {
    #[inline]
    pub const fn retained_len(self) -> usize {
        match self {
            RetainPolicy::LastByte => 1,
            RetainPolicy::MarkerPrefix => MARKER_LEN - 1,
        }
    }
}

/// Bytes dropped by the assembler. Absorbed locally, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingAnomaly {
    /// No marker in the buffer; everything but the retained tail was dropped.
    NoMarker { discarded: usize },
    /// Bytes ahead of the first marker were dropped when a frame was cut.
    LeadingNoise { discarded: usize },
}

impl FramingAnomaly {
    pub fn discarded(&self) -> usize {
        match *self {
            FramingAnomaly::NoMarker { discarded } => discarded,
            FramingAnomaly::LeadingNoise { discarded } => discarded,
        }
    }
}

impl fmt::Display for FramingAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingAnomaly::NoMarker { discarded } =>
                write!(f, "no marker found, discarded {} bytes", discarded),
            FramingAnomaly::LeadingNoise { discarded } =>
                write!(f, "discarded {} bytes ahead of marker", discarded),
        }
    }
}

/// Result of feeding one chunk to the assembler.
#[derive(Debug, Default)]
pub struct AssemblyPass {
    pub frames: Vec<Frame>,
    pub anomalies: Vec<FramingAnomaly>,
}

impl AssemblyPass {
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.anomalies.is_empty()
    }

    pub fn discarded(&self) -> usize {
        self.anomalies.iter().map(FramingAnomaly::discarded).sum()
    }
}
