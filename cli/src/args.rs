use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use frame_ingest_core::constants::{DEFAULT_JOURNAL_ROTATION, DEFAULT_RECV_CHUNK_SIZE};
use frame_ingest_core::sink::SqliteSinkConfig;
use frame_ingest_core::stream::framing::RetainPolicy;
use frame_ingest_core::stream::{IngestConfig, InputSource};

#[derive(Parser, Debug)]
#[command(
    name = "stream-parser",
    version,
    about = "Ingest a marker-framed vehicle telemetry stream over TCP"
)]
pub struct IngestArgs {
    /// Remote host
    #[clap(long)]
    pub host: String,
    /// Remote port
    #[clap(long)]
    pub port: u16,
    /// SQLite database file; without it records are only logged
    #[clap(long)]
    pub db: Option<PathBuf>,
    /// Stored identifier width; longer identifiers are truncated (with a warning)
    #[clap(long)]
    pub identifier_width: Option<usize>,
    /// Upper bound for one network read, in bytes
    #[clap(long, default_value_t = DEFAULT_RECV_CHUNK_SIZE)]
    pub chunk_size: usize,
    /// Keep a possible marker prefix (3 bytes) instead of 1 byte when no marker is buffered
    #[clap(long)]
    pub retain_marker_prefix: bool,
    /// TCP connect timeout in seconds
    #[clap(long)]
    pub connect_timeout_secs: Option<u64>,
    /// Anomaly journal file (JSON lines)
    #[clap(long)]
    pub journal: Option<PathBuf>,
    /// Journal entries per file before rotation
    #[clap(long, default_value_t = DEFAULT_JOURNAL_ROTATION)]
    pub journal_rotation: usize,
    /// Stop after this many seconds
    #[clap(long)]
    pub run_for_secs: Option<u64>,
    /// Log filter, e.g. `info` or `frame_ingest_core=debug`; RUST_LOG wins
    #[clap(long, default_value = "info")]
    pub log_level: String,
}

impl IngestArgs {
    pub fn ingest_config(&self) -> IngestConfig {
        let policy = if self.retain_marker_prefix {
            RetainPolicy::MarkerPrefix
        } else {
            RetainPolicy::LastByte
        };
        IngestConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_retain_policy(policy)
    }

    pub fn input(&self) -> InputSource {
        InputSource::Tcp {
            host: self.host.clone(),
            port: self.port,
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn sqlite_config(&self) -> SqliteSinkConfig {
        SqliteSinkConfig {
            identifier_width: self.identifier_width,
        }
    }

    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_and_port_are_required() {
        assert!(IngestArgs::try_parse_from(["stream-parser"]).is_err());
        assert!(IngestArgs::try_parse_from(["stream-parser", "--host", "h"]).is_err());
        assert!(IngestArgs::try_parse_from(["stream-parser", "--port", "9000"]).is_err());
    }

    #[test]
    fn defaults_map_onto_ingest_config() {
        let args = IngestArgs::try_parse_from(["stream-parser", "--host", "10.0.0.5", "--port", "9000"]).unwrap();
        let cfg = args.ingest_config();
        assert_eq!(cfg, IngestConfig::default());
        assert!(args.db.is_none());
        assert!(args.run_for().is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn marker_prefix_flag_selects_policy() {
        let args = IngestArgs::try_parse_from([
            "stream-parser",
            "--host",
            "h",
            "--port",
            "1",
            "--retain-marker-prefix",
            "--chunk-size",
            "512",
            "--identifier-width",
            "8",
        ])
        .unwrap();
        let cfg = args.ingest_config();
        assert_eq!(cfg.retain_policy, RetainPolicy::MarkerPrefix);
        assert_eq!(cfg.chunk_size, 512);
        assert_eq!(args.sqlite_config().identifier_width, Some(8));
    }
}
