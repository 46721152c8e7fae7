//! Blocking TCP socket wrapper.
//!
//! Provides a thin wrapper around [`std::net::TcpStream`] with ergonomic
//! send/recv APIs that take `&self`, so the one socket can be shared between
//! the caller's thread and the background workers through an `Arc`.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use super::Endpoint;

/// A blocking TCP stream socket.
///
/// All I/O methods take `&self`: the standard library implements `Read` and
/// `Write` for `&TcpStream`, and concurrent one-reader/one-writer access is
/// sound at the OS level. Shutting the socket down from another thread is
/// the designated way to unblock a pending read.
pub struct TcpSocket {
    inner: TcpStream,
}

impl TcpSocket {
    /// Opens a blocking connection to the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint cannot be resolved or the OS-level
    /// connect fails (refused, unreachable, timed out).
    pub fn connect(endpoint: &Endpoint) -> io::Result<Self> {
        let addr = endpoint.resolve()?;
        let inner = TcpStream::connect(addr)?;
        Ok(Self { inner })
    }

    /// Writes the full buffer to the socket.
    ///
    /// A zero-byte write surfaces as an error of kind [`ErrorKind::WriteZero`].
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure or if the peer stops accepting bytes.
    pub fn send_all(&self, buf: &[u8]) -> io::Result<()> {
        (&self.inner).write_all(buf)
    }

    /// Reads one chunk from the socket, blocking until data is available.
    ///
    /// Returns `Ok(0)` when the peer has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, or `WouldBlock`/`TimedOut` when a
    /// read timeout is configured and expires.
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&self.inner).read(buf)
    }

    /// Attempts a read, returning `Ok(None)` instead of a timeout error.
    ///
    /// Useful in polling loops where an expired read timeout is expected.
    pub fn try_recv(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.recv(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Sets the read timeout. `None` (the default) blocks indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the option cannot be set.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.inner.set_read_timeout(timeout)
    }

    /// Returns the local address of this socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the local address cannot be retrieved.
    pub fn local_addr(&self) -> io::Result<std::net::SocketAddr> {
        self.inner.local_addr()
    }

    /// Shuts down both directions of the connection.
    ///
    /// Unblocks any thread currently blocked in [`recv`](Self::recv). Errors
    /// from shutting down an already-dead connection are reported but
    /// harmless to ignore.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS rejects the shutdown.
    pub fn shutdown(&self) -> io::Result<()> {
        self.inner.shutdown(Shutdown::Both)
    }
}
