//! Pseudo-persistent TCP connections.
//!
//! `perconn` presents a stable, always-available logical connection to a
//! single remote TCP endpoint on top of an inherently unreliable socket.
//! A [`Conn`] handle offers plain byte-stream [`read`](Conn::read),
//! [`write`](Conn::write), and [`close`](Conn::close) operations; behind
//! it, one worker thread exclusively owns the live socket, executes
//! operations in submission order, and transparently redials with bounded
//! exponential backoff whenever the link drops. Only an explicit close is
//! permanent.
//!
//! Dial failures are retried silently (callers just wait) and reported to
//! an optional [`DiagnosticSink`]; I/O failures are returned to the one
//! caller they hit, tagged with the [`Operation`] that failed, and trigger
//! a redial; operations after [`close`](Conn::close) return
//! [`ConnError::Closed`].
//!
//! ```no_run
//! use std::time::Duration;
//! use perconn::{Conn, LogSink};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Address is required; everything else has a default.
//!     let conn = Conn::builder("echo-server.example.com:7")
//!         .dial_timeout(Duration::from_secs(5))
//!         .retry_min(Duration::from_secs(1))
//!         .retry_max(Duration::from_secs(30))
//!         .diagnostics(LogSink)
//!         .build()?;
//!
//!     conn.write(b"hello, world")?;
//!
//!     let mut buf = [0u8; 512];
//!     let n = conn.read(&mut buf)?;
//!     println!("echoed {n} bytes");
//!
//!     conn.close()?;
//!     Ok(())
//! }
//! ```

mod conn;
mod diagnostics;
mod error;

pub use conn::{
    Conn, ConnBuilder, ConnConfig, DEFAULT_DIAL_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_RETRY_MAX, DEFAULT_RETRY_MIN,
};
pub use diagnostics::{DiagnosticSink, LogSink};
pub use error::{BuildError, ConnError, DialError, Operation};
