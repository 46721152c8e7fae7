//! Connection lifecycle management.
//!
//! Owns the one TCP socket a client uses for its whole life and tracks where
//! it is in `Unconnected → Connected → Closed`. The transition to `Closed`
//! is terminal; a closed connection is never reopened.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::net::{Endpoint, TcpSocket};
use crate::trace::{debug, info, warn};

/// Error establishing the connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// OS-level connect failed (refused, unreachable, timed out, DNS).
    #[error("failed to connect: {0}")]
    Connect(#[source] io::Error),
    /// The client was already started, or has been closed.
    #[error("client already started or closed")]
    AlreadyStarted,
}

/// Connection lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unconnected,
    Connected,
    Closed,
}

/// Owns the socket and its lifecycle state.
///
/// The socket is handed out as an `Arc` so the queued transport's workers
/// can share it; the connection keeps its own handle for [`close`].
///
/// [`close`]: Connection::close
pub(crate) struct Connection {
    socket: Option<Arc<TcpSocket>>,
    state: State,
}

impl Connection {
    pub(crate) fn new() -> Self {
        Self {
            socket: None,
            state: State::Unconnected,
        }
    }

    /// Opens a blocking connection to the endpoint.
    ///
    /// Applies the read timeout (if any) before handing the socket out, so
    /// every later read observes it.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Connect`] if the OS-level connect fails; the
    /// connection stays `Unconnected` and may be retried by constructing a
    /// new client.
    pub(crate) fn connect(
        &mut self,
        endpoint: &Endpoint,
        read_timeout: Option<Duration>,
    ) -> Result<Arc<TcpSocket>, ConnectError> {
        if self.state != State::Unconnected {
            return Err(ConnectError::AlreadyStarted);
        }

        let socket = TcpSocket::connect(endpoint).map_err(|e| {
            warn!(endpoint = %endpoint, error = %e, "connect failed");
            ConnectError::Connect(e)
        })?;
        if let Err(e) = socket.set_read_timeout(read_timeout) {
            // The socket is already open; tear it down rather than hand out
            // one with an unknown timeout configuration.
            let _ = socket.shutdown();
            return Err(ConnectError::Connect(e));
        }

        info!(endpoint = %endpoint, "connected");
        let socket = Arc::new(socket);
        self.socket = Some(Arc::clone(&socket));
        self.state = State::Connected;
        Ok(socket)
    }

    /// Whether `connect` succeeded and [`close`](Connection::close) has not
    /// yet been called.
    pub(crate) fn is_connected(&self) -> bool {
        self.state == State::Connected
    }

    /// Shuts the socket down and marks the connection closed.
    ///
    /// Idempotent, and safe to call when `connect` never succeeded. The
    /// shutdown unblocks any thread sitting in a blocking read on the shared
    /// socket.
    pub(crate) fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }

        if let Some(socket) = self.socket.take() {
            if let Err(_e) = socket.shutdown() {
                // Peer may already be gone; nothing left to unblock.
                debug!(error = %_e, "socket shutdown failed");
            }
        }
        self.state = State::Closed;
        info!("connection closed");
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    #[test]
    fn connect_refused_leaves_unconnected() {
        let mut conn = Connection::new();
        let result = conn.connect(&Endpoint::localhost(1), None);
        assert!(matches!(result, Err(ConnectError::Connect(_))));
        assert!(!conn.is_connected());
    }

    #[test]
    fn close_without_connect_is_a_noop() {
        let mut conn = Connection::new();
        conn.close();
        conn.close();
        assert!(!conn.is_connected());
    }

    #[test]
    fn connect_then_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let accept = thread::spawn(move || listener.accept().unwrap());

        let mut conn = Connection::new();
        let socket = conn.connect(&Endpoint::localhost(port), None).unwrap();
        accept.join().unwrap();
        assert!(conn.is_connected());

        conn.close();
        assert!(!conn.is_connected());

        // The shared handle observes the shutdown: reads see end-of-stream.
        let mut buf = [0u8; 8];
        assert!(matches!(socket.recv(&mut buf), Ok(0) | Err(_)));
    }

    #[test]
    fn second_connect_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Endpoint::localhost(port);
        let accept = thread::spawn(move || listener.accept().unwrap());

        let mut conn = Connection::new();
        conn.connect(&endpoint, None).unwrap();
        accept.join().unwrap();

        assert!(matches!(
            conn.connect(&endpoint, None),
            Err(ConnectError::AlreadyStarted)
        ));
    }
}
