//! Wire constants for the marker-framed telemetry stream.

/// Frame marker. Every frame starts with it and the next occurrence ends it.
pub const FRAME_MARKER: [u8; 4] = [0xBB, 0x0B, 0x00, 0x00];
pub const MARKER_LEN: usize = FRAME_MARKER.len();

/// The next-marker search starts this many bytes after the first marker's start.
pub const NEXT_MARKER_SEARCH_OFFSET: usize = 2;

/// Identifier field: bytes `[9, 20)` of a frame (11 bytes, ASCII, NUL padded).
pub const IDENTIFIER_START: usize = 0x09;
pub const IDENTIFIER_END: usize = 0x14;

/// Frames shorter than this never yield an identifier.
pub const MIN_IDENTIFIER_FRAME_LEN: usize = IDENTIFIER_END;

/// Only the last `JSON_WINDOW_LEN` bytes of a frame are searched for a payload.
pub const JSON_WINDOW_LEN: usize = 200;

/// Defaults when the caller does not override the receive size.
pub const DEFAULT_RECV_CHUNK_SIZE: usize = 4096;
/// Receive size sanity bound (16 MiB).
pub const MAX_RECV_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Payload fields copied into a decoded record.
pub mod payload_fields {
    pub const MAKE: &str = "make";
    pub const MODEL: &str = "model";
    pub const COLOR: &str = "color";
}

/// Journal rotation default (entries per file).
pub const DEFAULT_JOURNAL_ROTATION: usize = 10_000;
