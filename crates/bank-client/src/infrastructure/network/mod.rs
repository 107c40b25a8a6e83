//! Network infrastructure: the UDP connection and the invocation-semantics
//! transport built on top of it.
//!
//! # How a call travels (for beginners)
//!
//! ```text
//! BankService ──request──▶ Transport::fetch ──bytes──▶ Connection::send ──▶ UDP
//!      ▲                        │  (timeout? retry per semantic)
//!      └──────response──────────┴──bytes── Connection::recv ◀──────────── UDP
//! ```
//!
//! [`Connection`] is the seam between the transport and the operating system.
//! Production code uses a connected [`UdpSocket`]; unit tests use a mock that
//! can drop replies on demand.

pub mod semantic;
pub mod transport;

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use bank_core::CodecError;
use thiserror::Error;
use tracing::debug;

pub use semantic::{InvalidSemantic, InvocationSemantic};
pub use transport::{MonitorOutcome, Transport};

/// Errors produced while exchanging datagrams with the server.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server address did not resolve or the socket could not be set up.
    #[error("could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// A send, receive or socket-option call failed.
    #[error("socket I/O error: {0}")]
    Io(#[from] io::Error),

    /// No reply arrived within the read timeout (single-attempt calls only).
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// A datagram could not be encoded or decoded.  Never retried.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Every allowed attempt timed out or failed.
    #[error("failed to get a reply after {attempts} attempts")]
    DeliveryFailed { attempts: u32 },
}

/// A datagram channel to one server.
///
/// The methods mirror those of a connected [`UdpSocket`], which is the
/// production implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Connection {
    /// Sends one datagram.
    fn send(&self, buf: &[u8]) -> io::Result<usize>;

    /// Receives one datagram into `buf`, returning its length.  A datagram
    /// longer than `buf` is truncated.
    fn recv(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Sets how long [`recv`](Connection::recv) may block.  `None` blocks
    /// forever.  `Some(Duration::ZERO)` is rejected by the OS.
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;
}

impl Connection for UdpSocket {
    fn send(&self, buf: &[u8]) -> io::Result<usize> {
        UdpSocket::send(self, buf)
    }

    fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        UdpSocket::recv(self, buf)
    }

    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        UdpSocket::set_read_timeout(self, timeout)
    }
}

/// Resolves `host:port`, binds an ephemeral local port of the same address
/// family and connects the socket to the server.
///
/// IPv4 addresses are preferred when the name resolves to both families.
///
/// # Errors
///
/// Returns [`TransportError::Connect`] if the name does not resolve or the
/// socket cannot be bound or connected.
pub fn connect(host: &str, port: u16) -> Result<UdpSocket, TransportError> {
    let addr_text = format!("{host}:{port}");
    let connect_err = |source: io::Error| TransportError::Connect {
        addr: addr_text.clone(),
        source,
    };

    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(connect_err)?
        .collect();
    let server = addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            connect_err(io::Error::new(
                io::ErrorKind::NotFound,
                "name resolved to no addresses",
            ))
        })?;

    let local: SocketAddr = if server.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(local).map_err(connect_err)?;
    socket.connect(server).map_err(connect_err)?;
    debug!(%server, local = ?socket.local_addr().ok(), "udp socket connected");
    Ok(socket)
}

/// Returns `true` for the error kinds a socket read timeout produces.
///
/// Unix reports an expired `SO_RCVTIMEO` as `WouldBlock`, Windows as
/// `TimedOut`.
pub(crate) fn is_timeout_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout_error_recognises_timed_out() {
        let e = io::Error::new(io::ErrorKind::TimedOut, "timed out");
        assert!(is_timeout_error(&e));
    }

    #[test]
    fn test_is_timeout_error_recognises_would_block() {
        let e = io::Error::new(io::ErrorKind::WouldBlock, "would block");
        assert!(is_timeout_error(&e));
    }

    #[test]
    fn test_is_timeout_error_rejects_other_kinds() {
        let e = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        assert!(!is_timeout_error(&e));
    }

    #[test]
    fn test_connect_to_loopback_succeeds() {
        // Arrange: a bound socket so the port is real.
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = server.local_addr().unwrap().port();

        // Act
        let socket = connect("127.0.0.1", port).unwrap();

        // Assert
        assert_eq!(socket.peer_addr().unwrap(), server.local_addr().unwrap());
    }

    #[test]
    fn test_connect_to_unresolvable_host_fails() {
        let err = connect("host.invalid.", 5000).unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[test]
    fn test_udp_socket_implements_connection() {
        // Arrange
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let client = connect("127.0.0.1", server.local_addr().unwrap().port()).unwrap();
        let conn: &dyn Connection = &client;

        // Act
        conn.send(b"ping").unwrap();
        let mut buf = [0u8; 8];
        let (n, from) = server.recv_from(&mut buf).unwrap();
        server.send_to(b"pong", from).unwrap();
        conn.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut reply = [0u8; 8];
        let m = conn.recv(&mut reply).unwrap();

        // Assert
        assert_eq!(&buf[..n], b"ping");
        assert_eq!(&reply[..m], b"pong");
    }
}
