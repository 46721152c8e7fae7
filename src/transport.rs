//! Payload transports.
//!
//! Two implementations of the same send/receive contract, selected at client
//! construction:
//!
//! - [`direct`]: blocking write/read on the caller's thread.
//! - [`queued`]: background TX/RX workers draining unbounded FIFO queues.
//!
//! Payloads are opaque byte sequences; neither transport imposes framing or
//! interprets content.

pub(crate) mod direct;
pub(crate) mod queued;

use std::io;

/// Error sending a payload.
///
/// Only the direct transport reports send failures synchronously; the queued
/// transport decouples the caller from the socket, so its `send` always
/// succeeds and a failed write is observable only as the absence of a reply.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// The peer closed the connection.
    #[error("connection broken: peer closed the socket")]
    BrokenConnection,
    /// The client is not in the started state.
    #[error("client is not connected")]
    NotConnected,
    /// The socket write failed for another reason.
    #[error("socket write failed: {0}")]
    Io(#[from] io::Error),
}
