use std::io;

use thiserror::Error;

use crate::journal::JournalError;

/// Transport failures. Terminal for the run: there is no reconnect.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("address {0} did not resolve")]
    Unresolved(String),

    #[error("read failed after {bytes_received} bytes: {source}")]
    Read {
        bytes_received: u64,
        #[source]
        source: io::Error,
    },

    #[error("connection setup failed: {0}")]
    Setup(#[source] io::Error),
}

/// Invalid runtime configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("receive chunk size {0} out of range (1..={max})", max = crate::constants::MAX_RECV_CHUNK_SIZE)]
    ChunkSize(usize),

    #[error("identifier window [{start}, {end}) is empty or inverted")]
    IdentifierWindow { start: usize, end: usize },

    #[error("json window must be non-zero")]
    JsonWindow,

    #[error("host must not be empty")]
    EmptyHost,

    #[error("port must be non-zero")]
    ZeroPort,

    #[error("identifier width must be non-zero")]
    IdentifierWidth,
}

/// Unified fatal error for the ingest pipeline.
///
/// Field and framing anomalies never show up here; they are absorbed by the
/// stage that detects them. Sink failures are counted, not propagated.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("pipeline error: {0}")]
    Pipeline(&'static str),
}
