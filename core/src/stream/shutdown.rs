//! Explicit cancellation shared by the receiver and the frame worker.
//!
//! The signal is a crossbeam channel that never carries a message: dropping
//! the only sender disconnects it, which every clone of the receiver
//! observes at once, including inside `select!`.
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam::channel::{bounded, never, Receiver, Sender, TryRecvError};
use tracing::{debug, warn};

/// Create a connected handle/signal pair.
pub fn shutdown_channel() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = bounded::<()>(0);
    let handle = ShutdownHandle {
        inner: Arc::new(HandleInner {
            tx: Mutex::new(Some(tx)),
            streams: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }),
    };
    (handle, ShutdownSignal { rx })
}

struct HandleInner {
    tx: Mutex<Option<Sender<()>>>,
    streams: Mutex<Vec<(u64, TcpStream)>>,
    next_id: AtomicU64,
}

/// Fires the shutdown. Cheap to clone; any clone may trigger.
#[derive(Clone)]
pub struct ShutdownHandle {
    inner: Arc<HandleInner>,
}

impl ShutdownHandle {
    /// Register a connection to close on trigger, so a blocked read returns.
    ///
    /// The registration lasts as long as the returned guard. Dropping the
    /// guard shuts the connection down and forgets it.
    pub fn attach(&self, stream: TcpStream) -> AttachedStream {
        let mut streams = lock(&self.inner.streams);
        if self.is_triggered() {
            let _ = stream.shutdown(Shutdown::Both);
            return AttachedStream { inner: None, id: 0 };
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        streams.push((id, stream));
        AttachedStream {
            inner: Some(Arc::clone(&self.inner)),
            id,
        }
    }

    /// Connections currently registered.
    pub fn attached(&self) -> usize {
        lock(&self.inner.streams).len()
    }

    pub fn trigger(&self) {
        if lock(&self.inner.tx).take().is_none() {
            return;
        }
        debug!("[SHUTDOWN] triggered");
        for (_, stream) in lock(&self.inner.streams).drain(..) {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                warn!("[SHUTDOWN] closing connection failed: {}", e);
            }
        }
    }

    pub fn is_triggered(&self) -> bool {
        lock(&self.inner.tx).is_none()
    }
}

/// Registration of one connection with a [`ShutdownHandle`].
#[must_use = "dropping the guard closes the connection"]
pub struct AttachedStream {
    inner: Option<Arc<HandleInner>>,
    id: u64,
}

impl Drop for AttachedStream {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        let removed = {
            let mut streams = lock(&inner.streams);
            let pos = streams.iter().position(|(id, _)| *id == self.id);
            pos.map(|i| streams.swap_remove(i))
        };
        // Already drained and closed if the trigger fired first.
        if let Some((_, stream)) = removed {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("[SHUTDOWN] closing detached connection: {}", e);
            }
        }
    }
}

/// Observes the shutdown. Handed to each actor at construction.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    rx: Receiver<()>,
}

impl ShutdownSignal {
    /// A signal that can never fire.
    pub fn never() -> Self {
        Self { rx: never() }
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Channel to wait on inside `select!`; it becomes ready on trigger.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::time::Duration;

    fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn trigger_is_seen_by_every_clone() {
        let (handle, signal) = shutdown_channel();
        let other = signal.clone();
        assert!(!signal.is_triggered());

        handle.clone().trigger();
        handle.trigger();
        assert!(handle.is_triggered());
        assert!(signal.is_triggered() && other.is_triggered());
        assert!(other.receiver().recv_timeout(Duration::from_millis(10)).is_err());
    }

    #[test]
    fn never_signal_stays_quiet() {
        let signal = ShutdownSignal::never();
        assert!(!signal.is_triggered());
    }

    #[test]
    fn dropping_guard_detaches_and_closes() {
        let (handle, _signal) = shutdown_channel();
        for _ in 0..3 {
            let (client, mut server) = connected_pair();
            let guard = handle.attach(client);
            assert_eq!(handle.attached(), 1);

            drop(guard);
            assert_eq!(handle.attached(), 0);
            server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let mut buf = [0u8; 8];
            assert_eq!(server.read(&mut buf).unwrap(), 0);
        }
    }

    #[test]
    fn attach_after_trigger_closes_at_once() {
        let (handle, _signal) = shutdown_channel();
        handle.trigger();
        let (client, mut server) = connected_pair();
        let _guard = handle.attach(client);
        assert_eq!(handle.attached(), 0);
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(server.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn trigger_closes_attached_connection() {
        let (handle, _signal) = shutdown_channel();
        let (client, mut server) = connected_pair();
        let guard = handle.attach(client);
        handle.trigger();
        assert_eq!(handle.attached(), 0);
        drop(guard);
        server.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(server.read(&mut buf).unwrap(), 0);
    }
}
