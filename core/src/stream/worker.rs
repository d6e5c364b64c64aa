// # 📂 src/stream/worker.rs

// ## Frame worker: assemble → extract → upsert, one chunk at a time

use std::time::Instant;

use bytes::Bytes;
use crossbeam::channel::{select, Receiver};
use tracing::{debug, error, trace};

use crate::journal::{AsyncJournal, JournalEntry};
use crate::sink::RecordSink;
use crate::stream::config::IngestConfig;
use crate::stream::extract::{extract_fields, ExtractConfig};
use crate::stream::framing::{Frame, FrameAssembler};
use crate::stream::io::StopReason;
use crate::stream::shutdown::ShutdownSignal;
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};

#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
    /// Bytes still buffered (an unterminated frame) when the worker stopped.
    pub pending: usize,
    pub stop: StopReason,
}

/// Sole owner of the assembler buffer. Frames are handed to the sink in
/// stream order.
pub struct FrameWorker<'a, S: RecordSink + ?Sized> {
    assembler: FrameAssembler,
    extract: ExtractConfig,
    sink: &'a mut S,
    journal: Option<&'a AsyncJournal>,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<'a, S: RecordSink + ?Sized> FrameWorker<'a, S> {
    pub fn new(config: &IngestConfig, sink: &'a mut S, journal: Option<&'a AsyncJournal>) -> Self {
        Self {
            assembler: FrameAssembler::new(config.retain_policy),
            extract: config.extract,
            sink,
            journal,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    /// Append one chunk and process every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) {
        let t = Instant::now();
        let pass = self.assembler.push(chunk);
        self.stage_times.add(Stage::Assemble, t.elapsed());

        for anomaly in &pass.anomalies {
            debug!("[ASSEMBLER] {}", anomaly);
            self.counters.add_framing_anomaly(anomaly);
            if let Some(journal) = self.journal {
                journal.append(JournalEntry::framing_discard(anomaly));
            }
        }

        for frame in pass.frames {
            self.process_frame(frame);
        }
    }

    fn process_frame(&mut self, frame: Frame) {
        self.counters.add_frame(frame.len());

        let t = Instant::now();
        let extraction = extract_fields(&frame, &self.extract);
        self.stage_times.add(Stage::Extract, t.elapsed());

        self.counters.add_record(&extraction.record);
        for anomaly in &extraction.anomalies {
            trace!(kind = anomaly.label(), "[EXTRACT] {} ({} byte frame)", anomaly, frame.len());
            self.counters.add_field_anomaly(anomaly);
        }

        let t = Instant::now();
        let result = self.sink.upsert(&extraction.record);
        self.stage_times.add(Stage::Persist, t.elapsed());

        match result {
            Ok(outcome) => self.counters.add_upsert(outcome),
            Err(e) => {
                error!(
                    "[SINK] {} upsert failed for {:?}: {}",
                    self.sink.name(),
                    extraction.record.identifier,
                    e
                );
                self.counters.add_sink_failure();
                if let Some(journal) = self.journal {
                    journal.append(JournalEntry::sink_failure(self.sink.name(), &e, &extraction.record, &frame));
                }
            }
        }
    }

    /// Consume chunks until the receiver hangs up (queue fully drained) or the
    /// shutdown fires (remaining chunks abandoned).
    pub fn run(mut self, chunks: Receiver<Bytes>, shutdown: ShutdownSignal) -> WorkerReport {
        let stop = loop {
            select! {
                recv(chunks) -> msg => match msg {
                    Ok(chunk) => self.feed(&chunk),
                    Err(_) => break StopReason::EndOfStream,
                },
                recv(shutdown.receiver()) -> _ => break StopReason::Shutdown,
            }
        };

        let pending = self.assembler.pending();
        if pending > 0 {
            debug!("[ASSEMBLER] {} bytes of unterminated frame dropped at stop", pending);
        }
        debug!(
            "[WORKER] stopped ({:?}) after {} frames",
            stop, self.counters.frames_emitted
        );

        WorkerReport {
            counters: self.counters,
            stage_times: self.stage_times,
            pending,
            stop,
        }
    }
}
