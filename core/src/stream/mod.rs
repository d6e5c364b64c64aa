//! stream: receive, assemble, extract, persist.
//!
//! Two actors joined by an unbounded queue:
//! - the receiver thread reads chunks off the connection
//! - the frame worker thread assembles frames, extracts fields and calls the sink
//!
//! Both are handed the same [`ShutdownSignal`] at construction.

pub mod config;
pub mod shutdown;
pub mod io;
pub mod framing;
pub mod extract;
pub mod worker;
pub mod pipeline;
pub mod core;

pub use config::IngestConfig;
pub use shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
pub use io::{ChunkReceiver, InputSource, ReceiverReport, StopReason};
pub use worker::{FrameWorker, WorkerReport};
pub use pipeline::run_ingest_pipeline;
pub use core::{ingest_stream, IngestSession};
