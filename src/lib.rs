//! Dual-mode TCP client for talking to a line-oriented remote process.
//!
//! A [`Client`] owns one persistent TCP connection and exposes the same
//! four-call surface (`start`, `send`, `receive`, `close`) in two modes:
//!
//! - [`Mode::Direct`]: every `send` is a blocking write and every `receive`
//!   is a blocking read, all on the caller's thread.
//! - [`Mode::Queued`]: two background worker threads shuttle byte payloads
//!   between the socket and a pair of unbounded FIFO queues, so `send` and
//!   `receive` never block the caller.
//!
//! The transport is a byte stream, not a message stream: payloads are opaque,
//! no framing is imposed, and message boundaries (newline-terminated lines in
//! the intended usage) are the caller's convention.
//!
//! # Example
//!
//! ```no_run
//! use tether::{Client, ClientConfig, Endpoint, Mode};
//!
//! let mut client = Client::new(ClientConfig {
//!     endpoint: Endpoint::localhost(3001),
//!     mode: Mode::Queued,
//!     ..ClientConfig::default()
//! });
//! client.start()?;
//! client.send(b"clear;")?;
//! while client.receive().is_none() {
//!     std::thread::yield_now();
//! }
//! client.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod net;
pub mod transport;

mod connection;
mod trace;

pub use client::{Client, ClientConfig, Mode};
pub use connection::ConnectError;
pub use net::Endpoint;
pub use trace::init_tracing;
pub use transport::SendError;
