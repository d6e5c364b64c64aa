// # 📂 src/stream/io.rs

// ## Normalized input + the receiving actor

use std::io::{Cursor, ErrorKind, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use bytes::Bytes;
use crossbeam::channel::Sender;
use tracing::{debug, info, warn};

use crate::stream::shutdown::{AttachedStream, ShutdownHandle, ShutdownSignal};
use crate::telemetry::TelemetryCounters;
use crate::types::{ConfigError, IngestError, TransportError};

/// Canonical input abstraction
pub enum InputSource {
    /// Client connection to the telemetry source.
    Tcp {
        host: String,
        port: u16,
        connect_timeout: Option<Duration>,
    },
    Reader(Box<dyn Read + Send>),
    Memory(Vec<u8>),
}

impl InputSource {
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        InputSource::Tcp {
            host: host.into(),
            port,
            connect_timeout: None,
        }
    }
}

/// Normalize the input into a boxed reader. TCP connections are registered
/// with `shutdown` so a trigger unblocks the pending read.
pub fn open_input(src: InputSource, shutdown: &ShutdownHandle) -> Result<Box<dyn Read + Send>, IngestError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Tcp { host, port, connect_timeout } => {
            if host.trim().is_empty() {
                return Err(ConfigError::EmptyHost.into());
            }
            if port == 0 {
                return Err(ConfigError::ZeroPort.into());
            }
            let stream = connect_tcp(&host, port, connect_timeout)?;
            let closer = stream.try_clone().map_err(TransportError::Setup)?;
            let attached = shutdown.attach(closer);
            Box::new(TcpInput { stream, _attached: attached })
        }
        InputSource::Reader(r) => r,
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// A client connection that stays registered for shutdown while it is read.
struct TcpInput {
    stream: TcpStream,
    _attached: AttachedStream,
}

impl Read for TcpInput {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

/// Open the TCP client connection.
pub fn connect_tcp(host: &str, port: u16, timeout: Option<Duration>) -> Result<TcpStream, TransportError> {
    let addr = format!("{}:{}", host, port);
    info!("[RECEIVER] connecting to {}", addr);

    let Some(timeout) = timeout else {
        return TcpStream::connect((host, port))
            .map_err(|source| TransportError::Connect { addr, source });
    };

    let candidates = (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Connect { addr: addr.clone(), source })?;

    let mut last_err = None;
    for candidate in candidates {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("[RECEIVER] {} failed: {}", candidate, e);
                last_err = Some(e);
            }
        }
    }
    Err(match last_err {
        Some(source) => TransportError::Connect { addr, source },
        None => TransportError::Unresolved(addr),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Zero-length read (peer closed) or queue sender dropped.
    EndOfStream,
    /// The shutdown signal fired.
    Shutdown,
    /// The consumer went away.
    QueueClosed,
}

#[derive(Debug, Clone)]
pub struct ReceiverReport {
    pub stop: StopReason,
    pub counters: TelemetryCounters,
    pub read_time: Duration,
}

/// Blocking read loop. Owns the connection and closes it when `run` returns.
pub struct ChunkReceiver<R: Read> {
    reader: R,
    chunk_size: usize,
    shutdown: ShutdownSignal,
}

impl<R: Read> ChunkReceiver<R> {
    pub fn new(reader: R, chunk_size: usize, shutdown: ShutdownSignal) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            shutdown,
        }
    }

    /// Push every non-empty read, in order, into `tx`.
    ///
    /// Returning drops `tx`, which is how the frame worker learns the stream
    /// has ended. No retry: a read error ends the run.
    pub fn run(mut self, tx: Sender<Bytes>) -> Result<ReceiverReport, TransportError> {
        let mut counters = TelemetryCounters::default();
        let mut read_time = Duration::ZERO;
        let mut buf = vec![0u8; self.chunk_size];

        let stop = loop {
            if self.shutdown.is_triggered() {
                break StopReason::Shutdown;
            }

            let t = Instant::now();
            let read = self.reader.read(&mut buf);
            read_time += t.elapsed();

            let n = match read {
                Ok(0) if self.shutdown.is_triggered() => break StopReason::Shutdown,
                Ok(0) => break StopReason::EndOfStream,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) if self.shutdown.is_triggered() => break StopReason::Shutdown,
                Err(source) => {
                    warn!("[RECEIVER] read failed after {} bytes: {}", counters.bytes_received, source);
                    return Err(TransportError::Read {
                        bytes_received: counters.bytes_received,
                        source,
                    });
                }
            };

            counters.add_chunk(n);
            if tx.send(Bytes::copy_from_slice(&buf[..n])).is_err() {
                break StopReason::QueueClosed;
            }
        };

        debug!(
            "[RECEIVER] stopped ({:?}) after {} chunks / {} bytes",
            stop, counters.chunks_received, counters.bytes_received
        );
        Ok(ReceiverReport { stop, counters, read_time })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::shutdown::shutdown_channel;
    use crossbeam::channel::unbounded;

    #[test]
    fn chunks_respect_size_and_order() {
        let data: Vec<u8> = (0u8..10).collect();
        let (tx, rx) = unbounded();
        let receiver = ChunkReceiver::new(Cursor::new(data.clone()), 4, ShutdownSignal::never());

        let report = receiver.run(tx).unwrap();
        let chunks: Vec<Bytes> = rx.iter().collect();

        assert_eq!(report.stop, StopReason::EndOfStream);
        assert_eq!(report.counters.chunks_received, 3);
        assert_eq!(chunks.iter().map(Bytes::len).collect::<Vec<_>>(), vec![4, 4, 2]);
        assert_eq!(chunks.concat(), data);
    }

    #[test]
    fn dropped_queue_stops_receiver() {
        let (tx, rx) = unbounded();
        drop(rx);
        let receiver = ChunkReceiver::new(Cursor::new(vec![1u8; 8]), 4, ShutdownSignal::never());
        assert_eq!(receiver.run(tx).unwrap().stop, StopReason::QueueClosed);
    }

    #[test]
    fn memory_input_needs_no_connection() {
        let (handle, _signal) = shutdown_channel();
        let mut reader = open_input(InputSource::Memory(b"abc".to_vec()), &handle).unwrap();
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "abc");
    }

    #[test]
    fn finished_tcp_run_releases_connection() {
        use std::io::Write;
        use std::net::{Shutdown, TcpListener};

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (handle, signal) = shutdown_channel();

        for _ in 0..3 {
            let reader = open_input(InputSource::tcp("127.0.0.1", port), &handle).unwrap();
            let (mut server, _) = listener.accept().unwrap();
            assert_eq!(handle.attached(), 1);

            server.write_all(b"hello").unwrap();
            server.shutdown(Shutdown::Write).unwrap();

            let (tx, rx) = unbounded();
            let report = ChunkReceiver::new(reader, 16, signal.clone()).run(tx).unwrap();
            assert_eq!(report.stop, StopReason::EndOfStream);
            assert_eq!(rx.iter().collect::<Vec<_>>().concat(), b"hello");

            // the receiver owned the reader, so the connection is gone
            assert_eq!(handle.attached(), 0);
            server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let mut buf = [0u8; 4];
            assert_eq!(server.read(&mut buf).unwrap(), 0);
        }
    }
}
