// ## `core.rs`: stable public API

use tracing::debug;

use crate::journal::{AsyncJournal, JournalEntry};
use crate::sink::RecordSink;
use crate::stream::config::IngestConfig;
use crate::stream::io::{open_input, InputSource};
use crate::stream::pipeline::run_ingest_pipeline;
use crate::stream::shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
use crate::telemetry::TelemetrySnapshot;
use crate::types::IngestError;

/// One configured ingest run: config, shutdown pair and optional journal.
///
/// Grab [`IngestSession::shutdown_handle`] before calling `run`; triggering
/// it from any thread stops both actors and closes the connection.
pub struct IngestSession {
    config: IngestConfig,
    journal: Option<AsyncJournal>,
    handle: ShutdownHandle,
    signal: ShutdownSignal,
}

impl IngestSession {
    pub fn new(config: IngestConfig) -> Self {
        let (handle, signal) = shutdown_channel();
        Self {
            config,
            journal: None,
            handle,
            signal,
        }
    }

    pub fn with_journal(mut self, journal: AsyncJournal) -> Self {
        debug!("[SESSION] journaling to {}", journal.path().display());
        self.journal = Some(journal);
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// Connect (or wrap) the input, then run the pipeline to completion.
    pub fn run<S>(&self, input: InputSource, sink: &mut S) -> Result<TelemetrySnapshot, IngestError>
    where
        S: RecordSink + Send + ?Sized,
    {
        self.config.validate()?;
        let reader = open_input(input, &self.handle)?;

        self.note(format!("ingest started (sink={})", sink.name()));
        let result = run_ingest_pipeline(reader, sink, &self.config, self.signal.clone(), self.journal.as_ref());
        match &result {
            Ok(snapshot) => self.note(format!("ingest stopped after {} frames", snapshot.frames())),
            Err(e) => self.note(format!("ingest failed: {}", e)),
        }
        result
    }

    /// Flush and close the journal, if any.
    pub fn close(self) -> Result<(), IngestError> {
        if let Some(journal) = self.journal {
            journal.close()?;
        }
        Ok(())
    }

    fn note(&self, message: String) {
        if let Some(journal) = &self.journal {
            journal.append(JournalEntry::lifecycle(message));
        }
    }
}

/// One-shot helper: no journal, no external shutdown.
pub fn ingest_stream<S>(input: InputSource, sink: &mut S, config: IngestConfig) -> Result<TelemetrySnapshot, IngestError>
where
    S: RecordSink + Send + ?Sized,
{
    IngestSession::new(config).run(input, sink)
}
