//! Network endpoint types.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs};

/// A remote peer (hostname + port).
///
/// The hostname is kept as a string and only resolved when a connection is
/// opened, so construction never fails and DNS problems surface as connect
/// errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates a new endpoint from a hostname (or IP literal) and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Creates a localhost endpoint on the given port.
    #[must_use]
    pub fn localhost(port: u16) -> Self {
        Self::new("127.0.0.1", port)
    }

    /// Returns the hostname.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Resolves the endpoint to a socket address.
    ///
    /// Uses the first address the resolver yields.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails or yields no addresses.
    pub fn resolve(&self) -> io::Result<SocketAddr> {
        let mut addrs = (self.host.as_str(), self.port).to_socket_addrs()?;
        addrs.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses found for {self}"),
            )
        })
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_new() {
        let ep = Endpoint::new("192.168.1.100", 8080);
        assert_eq!(ep.host(), "192.168.1.100");
        assert_eq!(ep.port(), 8080);
    }

    #[test]
    fn endpoint_localhost() {
        let ep = Endpoint::localhost(3000);
        assert_eq!(ep.host(), "127.0.0.1");
        assert_eq!(ep.port(), 3000);
    }

    #[test]
    fn endpoint_display() {
        let ep = Endpoint::new("example.com", 9000);
        assert_eq!(format!("{ep}"), "example.com:9000");
    }

    #[test]
    fn endpoint_resolves_ip_literal() {
        let ep = Endpoint::localhost(5000);
        let addr = ep.resolve().unwrap();
        assert_eq!(addr, "127.0.0.1:5000".parse().unwrap());
    }

    #[test]
    fn endpoint_from_socket_addr() {
        let addr: SocketAddr = "10.0.0.1:5000".parse().unwrap();
        let ep = Endpoint::from(addr);
        assert_eq!(ep.host(), "10.0.0.1");
        assert_eq!(ep.port(), 5000);
    }
}
