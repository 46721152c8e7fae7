//! Client facade.
//!
//! The single public surface over the connection and the two transports.
//! Callers pick a [`Mode`] at construction and never see the branch again:
//! `send` and `receive` behave per the mode's contract, `start` and `close`
//! drive the lifecycle.
//!
//! Facade state machine: `Created → Started → Closed`. `send` and `receive`
//! are meaningful only in `Started`; outside it the direct transport reports
//! an error and the queued transport works against queues nothing drains.

use std::time::Duration;

use crate::connection::{ConnectError, Connection};
use crate::net::Endpoint;
use crate::trace::info;
use crate::transport::SendError;
use crate::transport::direct::DirectTransport;
use crate::transport::queued::QueuedTransport;

/// Transport selection, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Blocking request-then-reply on the caller's thread.
    Direct,
    /// Background workers and FIFO queues; `send`/`receive` never block.
    #[default]
    Queued,
}

/// Configuration for a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Remote peer to connect to.
    pub endpoint: Endpoint,
    /// Transport mode.
    pub mode: Mode,
    /// Read timeout applied to the socket. `None` (the default) means reads
    /// block indefinitely; `close` is then the only way to unblock them.
    pub read_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::localhost(0),
            mode: Mode::default(),
            read_timeout: None,
        }
    }
}

enum Transport {
    Direct(DirectTransport),
    Queued(QueuedTransport),
}

/// A dual-mode TCP client over one persistent connection.
///
/// `send` and `receive` take `&self` and may be called from multiple caller
/// threads; `start` and `close` take `&mut self` and drive the lifecycle.
/// Dropping a started client signals its workers and shuts the socket down
/// without joining; use [`close`](Client::close) for an orderly stop.
pub struct Client {
    config: ClientConfig,
    connection: Connection,
    transport: Transport,
}

impl Client {
    /// Creates an unstarted client.
    ///
    /// In queued mode the queues exist from this point on, so payloads may
    /// be enqueued with [`send`](Client::send) even before
    /// [`start`](Client::start); they are transmitted once the connection
    /// and workers are up.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let transport = match config.mode {
            Mode::Direct => Transport::Direct(DirectTransport::new()),
            Mode::Queued => Transport::Queued(QueuedTransport::new()),
        };
        Self {
            config,
            connection: Connection::new(),
            transport,
        }
    }

    /// Connects to the configured endpoint and, in queued mode, spawns the
    /// TX and RX workers.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Connect`] when the OS-level connect fails;
    /// the client stays unstarted and inert. Returns
    /// [`ConnectError::AlreadyStarted`] when called outside the `Created`
    /// state.
    pub fn start(&mut self) -> Result<(), ConnectError> {
        let socket = self
            .connection
            .connect(&self.config.endpoint, self.config.read_timeout)?;

        match &mut self.transport {
            Transport::Direct(direct) => direct.attach(socket),
            Transport::Queued(queued) => queued.start(socket),
        }

        info!(endpoint = %self.config.endpoint, mode = ?self.config.mode, "client started");
        Ok(())
    }

    /// Whether the client is in the `Started` state.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    /// Sends one payload.
    ///
    /// Queued mode: enqueues and returns immediately; never blocks and never
    /// fails, including before `start` (the payload is retained) and after
    /// `close` (the payload is silently dropped).
    ///
    /// Direct mode: one blocking write of the full payload.
    ///
    /// # Errors
    ///
    /// Direct mode only: [`SendError::BrokenConnection`] when the peer has
    /// closed the connection, [`SendError::NotConnected`] outside `Started`,
    /// [`SendError::Io`] for other write failures.
    pub fn send(&self, payload: &[u8]) -> Result<(), SendError> {
        match &self.transport {
            Transport::Direct(direct) => direct.send(payload),
            Transport::Queued(queued) => {
                queued.enqueue(payload.to_vec());
                Ok(())
            }
        }
    }

    /// Receives one chunk, decoded as UTF-8.
    ///
    /// Queued mode: non-blocking pop from the inbound queue. Direct mode:
    /// one blocking OS read (bounded by the configured read timeout, if
    /// any).
    ///
    /// Returns `None` ("no data") when nothing is available or on any
    /// failure: timeout, decode failure, peer close. The caller cannot
    /// distinguish these cases.
    #[must_use]
    pub fn receive(&self) -> Option<String> {
        match &self.transport {
            Transport::Direct(direct) => direct.receive(),
            Transport::Queued(queued) => {
                let chunk = queued.try_dequeue()?;
                String::from_utf8(chunk).ok()
            }
        }
    }

    /// Stops the client: signals the workers, shuts the socket down
    /// (unblocking a pending read), and waits for the workers to exit.
    ///
    /// Idempotent. The wait is bounded in practice: the TX worker wakes on
    /// its queue-poll timeout and the RX worker on the socket shutdown.
    pub fn close(&mut self) {
        match &mut self.transport {
            Transport::Queued(queued) => {
                queued.signal_exit();
                self.connection.close();
                queued.join();
            }
            Transport::Direct(_) => self.connection.close(),
        }
        info!("client closed");
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // Signal shutdown if not already done; workers are left to exit on
        // their own rather than joined. In normal usage close() should be
        // called explicitly.
        if let Transport::Queued(queued) = &self.transport {
            queued.signal_exit();
        }
        self.connection.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_queued_and_unbounded() {
        let config = ClientConfig::default();
        assert_eq!(config.mode, Mode::Queued);
        assert!(config.read_timeout.is_none());
    }

    #[test]
    fn start_failure_leaves_client_unstarted() {
        let mut client = Client::new(ClientConfig {
            endpoint: Endpoint::localhost(1),
            ..ClientConfig::default()
        });
        assert!(matches!(client.start(), Err(ConnectError::Connect(_))));
        assert!(!client.is_connected());
    }

    #[test]
    fn queued_send_before_start_succeeds() {
        let client = Client::new(ClientConfig::default());
        client.send(b"early").unwrap();
        assert!(client.receive().is_none());
    }

    #[test]
    fn direct_send_before_start_is_not_connected() {
        let client = Client::new(ClientConfig {
            mode: Mode::Direct,
            ..ClientConfig::default()
        });
        assert!(matches!(client.send(b"x"), Err(SendError::NotConnected)));
        assert!(client.receive().is_none());
    }

    #[test]
    fn close_before_start_is_safe() {
        let mut client = Client::new(ClientConfig::default());
        client.close();
        client.close();
        assert!(!client.is_connected());
    }
}
