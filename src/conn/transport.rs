//! Dialing and the socket seam the worker is generic over.

use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
    time::Duration,
};

/// A live byte stream owned by the worker.
///
/// `shutdown` exists so close outcomes are observable; plain `Drop` would
/// swallow the error a user-initiated close must return.
pub(crate) trait Stream: Read + Write + Send {
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Stream for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Establishes connections for the worker. One dial per connection attempt;
/// the worker owns the resulting stream exclusively until it breaks or the
/// user closes it.
pub(crate) trait Dialer: Send {
    type Stream: Stream;

    fn dial(&mut self) -> io::Result<Self::Stream>;
}

/// Dials a TCP endpoint, optionally bounded by a timeout.
pub(crate) struct TcpDialer {
    address: String,
    timeout: Duration,
}

impl TcpDialer {
    pub(crate) fn new(address: String, timeout: Duration) -> Self {
        Self { address, timeout }
    }
}

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&mut self) -> io::Result<TcpStream> {
        if self.timeout.is_zero() {
            return TcpStream::connect(self.address.as_str());
        }
        let mut last_err = None;
        for addr in self.address.as_str().to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => return Ok(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("{} resolved to no addresses", self.address),
            )
        }))
    }
}
