//! Queued transport: background TX/RX workers over FIFO queues.
//!
//! Responsibilities:
//! - Decouple the caller from the socket: `enqueue` and `try_dequeue` never
//!   touch the network and never block.
//! - TX worker drains the outbound queue and writes each payload in full.
//! - RX worker reads fixed-size chunks and pushes each one verbatim onto the
//!   inbound queue.
//! - Both workers loop until the shared exit flag is set; the RX worker is
//!   additionally unblocked by the socket being shut down out from under it.
//!
//! Ordering is FIFO per queue. There is no correspondence between one
//! enqueued payload and one dequeued chunk: the wire is a byte stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::net::TcpSocket;
use crate::trace::{debug, info, warn};

/// Maximum bytes one RX read will pull from the socket.
const RECV_CHUNK_SIZE: usize = 1024;

/// How long the TX worker waits on an empty outbound queue before checking
/// the exit flag again. Bounds both idle CPU use and shutdown latency.
const POP_TIMEOUT: Duration = Duration::from_millis(10);

/// Queue-mediated transport.
///
/// The queues exist from construction, so payloads enqueued before the
/// workers are running are retained and transmitted once they are. Workers
/// are spawned by [`start`](QueuedTransport::start) and stopped by
/// [`signal_exit`](QueuedTransport::signal_exit) +
/// [`join`](QueuedTransport::join).
pub(crate) struct QueuedTransport {
    outbound_tx: Sender<Vec<u8>>,
    outbound_rx: Receiver<Vec<u8>>,
    inbound_tx: Sender<Vec<u8>>,
    inbound_rx: Receiver<Vec<u8>>,
    exit: Arc<AtomicBool>,
    tx_handle: Option<JoinHandle<()>>,
    rx_handle: Option<JoinHandle<()>>,
}

impl QueuedTransport {
    pub(crate) fn new() -> Self {
        let (outbound_tx, outbound_rx) = unbounded();
        let (inbound_tx, inbound_rx) = unbounded();
        Self {
            outbound_tx,
            outbound_rx,
            inbound_tx,
            inbound_rx,
            exit: Arc::new(AtomicBool::new(false)),
            tx_handle: None,
            rx_handle: None,
        }
    }

    /// Spawns the TX and RX workers against the connected socket.
    ///
    /// Called once, at client start; the facade's state machine guarantees
    /// at most one worker pair per client.
    ///
    /// # Panics
    ///
    /// Panics if thread spawning fails.
    pub(crate) fn start(&mut self, socket: Arc<TcpSocket>) {
        debug!("spawning TX worker");
        let outbound = self.outbound_rx.clone();
        let tx_exit = Arc::clone(&self.exit);
        let tx_socket = Arc::clone(&socket);
        let tx_handle = thread::Builder::new()
            .name("tether-tx".into())
            .spawn(move || {
                info!("TX worker started");
                tx_loop(&tx_socket, &outbound, &tx_exit);
                info!("TX worker exiting");
            })
            .expect("failed to spawn TX worker");

        debug!("spawning RX worker");
        let inbound = self.inbound_tx.clone();
        let rx_exit = Arc::clone(&self.exit);
        let rx_handle = thread::Builder::new()
            .name("tether-rx".into())
            .spawn(move || {
                info!("RX worker started");
                rx_loop(&socket, &inbound, &rx_exit);
                info!("RX worker exiting");
            })
            .expect("failed to spawn RX worker");

        self.tx_handle = Some(tx_handle);
        self.rx_handle = Some(rx_handle);
    }

    /// Pushes a payload onto the outbound queue. Never blocks, never fails.
    pub(crate) fn enqueue(&self, payload: Vec<u8>) {
        // Cannot disconnect: the transport owns a receiver for the queue's
        // whole life.
        let _ = self.outbound_tx.send(payload);
    }

    /// Pops one chunk from the inbound queue, or `None` if it is empty.
    pub(crate) fn try_dequeue(&self) -> Option<Vec<u8>> {
        self.inbound_rx.try_recv().ok()
    }

    /// Sets the shared exit flag. Idempotent.
    ///
    /// Workers observe the flag on their next loop iteration; the RX worker
    /// may be sitting in a blocking read, which the caller unblocks by
    /// closing the socket before [`join`](QueuedTransport::join).
    pub(crate) fn signal_exit(&self) {
        self.exit.store(true, Ordering::Relaxed);
    }

    /// Waits for both workers to exit. A no-op if they were never started.
    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.tx_handle.take() {
            debug!("waiting for TX worker to exit");
            let _ = handle.join();
        }
        if let Some(handle) = self.rx_handle.take() {
            debug!("waiting for RX worker to exit");
            let _ = handle.join();
        }
    }
}

/// TX worker loop: drain the outbound queue into the socket.
fn tx_loop(socket: &TcpSocket, outbound: &Receiver<Vec<u8>>, exit: &AtomicBool) {
    while !exit.load(Ordering::Relaxed) {
        match outbound.recv_timeout(POP_TIMEOUT) {
            Ok(payload) => {
                if let Err(_e) = socket.send_all(&payload) {
                    // Fatal transport failure: stop writing, leave recovery
                    // to the caller.
                    warn!(error = %_e, "TX: write failed, stopping");
                    return;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// RX worker loop: read chunks from the socket onto the inbound queue.
fn rx_loop(socket: &TcpSocket, inbound: &Sender<Vec<u8>>, exit: &AtomicBool) {
    let mut buf = [0u8; RECV_CHUNK_SIZE];
    while !exit.load(Ordering::Relaxed) {
        match socket.try_recv(&mut buf) {
            // Read timeout expired (only when one is configured): retry.
            Ok(None) => {}
            Ok(Some(0)) => {
                info!("RX: peer closed connection");
                return;
            }
            Ok(Some(n)) => {
                if inbound.send(buf[..n].to_vec()).is_err() {
                    return;
                }
            }
            Err(_e) => {
                // Either the socket was shut down under us during close, or
                // the transport failed.
                if !exit.load(Ordering::Relaxed) {
                    warn!(error = %_e, "RX: read failed, stopping");
                }
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::net::TcpListener;
    use std::time::Instant;

    use super::*;
    use crate::net::Endpoint;

    #[test]
    fn enqueue_without_workers_does_not_block() {
        let transport = QueuedTransport::new();
        transport.enqueue(b"one".to_vec());
        transport.enqueue(b"two".to_vec());
        assert_eq!(transport.outbound_rx.len(), 2);
        assert!(transport.try_dequeue().is_none());
    }

    #[test]
    fn dequeue_preserves_insertion_order() {
        let transport = QueuedTransport::new();
        transport.inbound_tx.send(b"first".to_vec()).unwrap();
        transport.inbound_tx.send(b"second".to_vec()).unwrap();
        assert_eq!(transport.try_dequeue().unwrap(), b"first");
        assert_eq!(transport.try_dequeue().unwrap(), b"second");
        assert!(transport.try_dequeue().is_none());
    }

    #[test]
    fn join_without_start_is_a_noop() {
        let mut transport = QueuedTransport::new();
        transport.signal_exit();
        transport.join();
    }

    #[test]
    fn workers_drain_queue_in_order_and_stop_on_exit() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut peer, _) = listener.accept().unwrap();
            let mut collected = Vec::new();
            let mut buf = [0u8; 256];
            while collected.len() < 9 {
                let n = peer.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                collected.extend_from_slice(&buf[..n]);
            }
            collected
        });

        let socket = Arc::new(TcpSocket::connect(&Endpoint::localhost(port)).unwrap());

        let mut transport = QueuedTransport::new();
        // Enqueued before the workers exist; transmitted once they run.
        transport.enqueue(b"abc".to_vec());
        transport.enqueue(b"def".to_vec());
        transport.enqueue(b"ghi".to_vec());
        transport.start(Arc::clone(&socket));

        assert_eq!(server.join().unwrap(), b"abcdefghi");

        let start = Instant::now();
        transport.signal_exit();
        socket.shutdown().unwrap();
        transport.join();
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
