//! stream-parser: connect, ingest until the peer closes, print telemetry.

mod args;

use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use frame_ingest_core::journal::AsyncJournal;
use frame_ingest_core::sink::{LogSink, RecordSink, SqliteSink};
use frame_ingest_core::stream::IngestSession;

use crate::args::IngestArgs;

fn main() -> Result<()> {
    let args = IngestArgs::parse();
    init_tracing(&args.log_level)?;

    let mut session = IngestSession::new(args.ingest_config());
    if let Some(path) = &args.journal {
        let journal = AsyncJournal::open(path, args.journal_rotation)
            .with_context(|| format!("opening journal {}", path.display()))?;
        session = session.with_journal(journal);
    }

    let mut sink: Box<dyn RecordSink + Send> = match &args.db {
        Some(path) => Box::new(
            SqliteSink::open(path, args.sqlite_config())
                .with_context(|| format!("opening database {}", path.display()))?,
        ),
        None => Box::new(LogSink),
    };
    info!("[MAIN] sink={} target={}:{}", sink.name(), args.host, args.port);

    if let Some(limit) = args.run_for() {
        let handle = session.shutdown_handle();
        thread::spawn(move || {
            thread::sleep(limit);
            info!("[SHUTDOWN] run time of {:?} reached", limit);
            handle.trigger();
        });
    }

    let result = session.run(args.input(), &mut *sink);
    session.close().context("closing journal")?;

    let snapshot = result.with_context(|| format!("ingesting from {}:{}", args.host, args.port))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("serializing telemetry")?
    );
    Ok(())
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .with_context(|| format!("invalid log filter {:?}", default_filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}
