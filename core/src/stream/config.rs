use crate::constants::{DEFAULT_RECV_CHUNK_SIZE, MAX_RECV_CHUNK_SIZE};
use crate::stream::extract::ExtractConfig;
use crate::stream::framing::RetainPolicy;
use crate::types::ConfigError;

/// Runtime knobs for one ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Upper bound for a single network read.
    pub chunk_size: usize,
    /// What the assembler keeps when no marker is buffered.
    pub retain_policy: RetainPolicy,
    pub extract: ExtractConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_RECV_CHUNK_SIZE,
            retain_policy: RetainPolicy::LastByte,
            extract: ExtractConfig::default(),
        }
    }
}

impl IngestConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_retain_policy(mut self, policy: RetainPolicy) -> Self {
        self.retain_policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_RECV_CHUNK_SIZE {
            return Err(ConfigError::ChunkSize(self.chunk_size));
        }
        self.extract.validate()
    }
}
