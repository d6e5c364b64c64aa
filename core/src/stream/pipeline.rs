// # 📂 src/stream/pipeline.rs

// ## Pipeline wiring (no framing or extraction logic)

use std::io::Read;
use std::thread;

use bytes::Bytes;
use crossbeam::channel::unbounded;
use tracing::{debug, info, warn};

use crate::journal::AsyncJournal;
use crate::sink::RecordSink;
use crate::stream::config::IngestConfig;
use crate::stream::io::ChunkReceiver;
use crate::stream::shutdown::ShutdownSignal;
use crate::stream::worker::FrameWorker;
use crate::telemetry::{Stage, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::IngestError;

/// Run the receiver and the frame worker until the stream ends or `shutdown`
/// fires, and return the merged telemetry.
///
/// The queue between them is unbounded; a slow sink grows memory, it never
/// stalls the read loop.
pub fn run_ingest_pipeline<R, S>(
    reader: R,
    sink: &mut S,
    config: &IngestConfig,
    shutdown: ShutdownSignal,
    journal: Option<&AsyncJournal>,
) -> Result<TelemetrySnapshot, IngestError>
where
    R: Read + Send,
    S: RecordSink + Send + ?Sized,
{
    config.validate()?;

    let mut timer = TelemetryTimer::new();
    info!(
        "[PIPELINE] start (chunk_size={}, retain={:?})",
        config.chunk_size, config.retain_policy
    );

    // ---- Channels ----
    let (chunk_tx, chunk_rx) = unbounded::<Bytes>();

    let receiver = ChunkReceiver::new(reader, config.chunk_size, shutdown.clone());
    let worker = FrameWorker::new(config, sink, journal);

    let (receiver_res, worker_res) = thread::scope(|scope| {
        // ---- Receiver thread ----
        let r = scope.spawn(move || receiver.run(chunk_tx));
        // ---- Frame worker thread ----
        let w = scope.spawn(move || worker.run(chunk_rx, shutdown));
        (r.join(), w.join())
    });

    let receiver_res = receiver_res.map_err(|_| IngestError::Pipeline("receiver thread panicked"))?;
    let worker_report = worker_res.map_err(|_| IngestError::Pipeline("frame worker thread panicked"))?;

    let mut counters = TelemetryCounters::default();
    counters += worker_report.counters;
    timer.stage_times.merge(&worker_report.stage_times);

    let receiver_report = match receiver_res {
        Ok(report) => report,
        Err(e) => {
            timer.finish();
            let snapshot = TelemetrySnapshot::from(&counters, &timer);
            warn!(
                "[PIPELINE] aborted: {} ({} frames processed)",
                e,
                snapshot.frames()
            );
            return Err(e.into());
        }
    };

    counters += receiver_report.counters;
    timer.add_stage_time(Stage::Receive, receiver_report.read_time);
    timer.finish();

    let snapshot = TelemetrySnapshot::from(&counters, &timer);
    info!(
        "[PIPELINE] done: receiver={:?} worker={:?} chunks={} bytes={} frames={} delivered={} skipped={} sink_failures={} discarded={} pending={} elapsed={:?}",
        receiver_report.stop,
        worker_report.stop,
        counters.chunks_received,
        counters.bytes_received,
        counters.frames_emitted,
        counters.records_delivered(),
        counters.records_skipped,
        counters.sink_failures,
        counters.bytes_discarded,
        worker_report.pending,
        snapshot.elapsed,
    );
    for (stage, _) in &snapshot.stage_times {
        debug!("[PIPELINE] stage {}: {:.3} ms", stage, snapshot.stage_times.get_ms(*stage));
    }
    debug!("[PIPELINE] busy {:?} across stages", snapshot.stage_times.total());

    Ok(snapshot)
}
