//! Direct (blocking) transport.
//!
//! Every send is one blocking write and every receive is one blocking read,
//! both on the caller's thread. No queues, no workers; the caller gets the
//! socket's own pacing.

use std::io::ErrorKind;
use std::sync::Arc;

use super::SendError;
use crate::net::TcpSocket;

/// Read buffer size for one blocking receive.
const RECV_BUF_SIZE: usize = 8192;

/// Blocking send/receive over the shared socket.
///
/// Holds no socket until the client starts; direct-mode calls before then
/// fail with [`SendError::NotConnected`] (send) or return no data (receive).
pub(crate) struct DirectTransport {
    socket: Option<Arc<TcpSocket>>,
}

impl DirectTransport {
    pub(crate) fn new() -> Self {
        Self { socket: None }
    }

    /// Attaches the connected socket. Called once, at client start.
    pub(crate) fn attach(&mut self, socket: Arc<TcpSocket>) {
        self.socket = Some(socket);
    }

    /// Writes the full payload to the socket, blocking until done.
    ///
    /// # Errors
    ///
    /// [`SendError::BrokenConnection`] when the OS reports the peer is gone
    /// (a zero-byte write, a reset, or a broken pipe); [`SendError::Io`] for
    /// any other write failure.
    pub(crate) fn send(&self, payload: &[u8]) -> Result<(), SendError> {
        let Some(socket) = &self.socket else {
            return Err(SendError::NotConnected);
        };
        match socket.send_all(payload) {
            Ok(()) => Ok(()),
            Err(e) if peer_gone(e.kind()) => Err(SendError::BrokenConnection),
            Err(e) => Err(SendError::Io(e)),
        }
    }

    /// One blocking read, decoded as UTF-8.
    ///
    /// Returns `None` on any failure: read timeout, peer close, decode
    /// failure, or OS error. The caller cannot distinguish these cases.
    pub(crate) fn receive(&self) -> Option<String> {
        let socket = self.socket.as_ref()?;
        let mut buf = [0u8; RECV_BUF_SIZE];
        let n = socket.recv(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        String::from_utf8(buf[..n].to_vec()).ok()
    }
}

/// Error kinds the OS uses to report that the peer closed the connection.
fn peer_gone(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::WriteZero
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
    )
}
