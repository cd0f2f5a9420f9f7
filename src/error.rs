//! Error taxonomy for the persistent connection.
//!
//! Three failure families exist and deliberately travel different paths:
//! [`DialError`] goes to the diagnostic sink only and triggers backoff,
//! [`ConnError::Io`] is returned to the caller whose job failed and also
//! reported to the sink, and [`ConnError::Closed`] is returned to any job
//! submitted after a user-initiated close and is never reported anywhere.

use std::{fmt, io};

use thiserror::Error;

/// The operation a job asked the worker to perform.
///
/// Carried by [`ConnError::Io`] so callers can tell which half of the
/// stream failed without inspecting the source error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Close,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Close => "close",
        };
        f.write_str(name)
    }
}

/// Errors surfaced to callers of [`Conn`](crate::Conn) operations.
#[derive(Debug, Error)]
pub enum ConnError {
    /// The connection was closed by an earlier [`Conn::close`](crate::Conn::close)
    /// call. Terminal: no redial will ever be attempted.
    #[error("cannot perform I/O on closed connection")]
    Closed,
    /// An I/O operation against the live socket failed. The worker tears the
    /// socket down and redials; the failure stays local to the one job that
    /// hit it.
    #[error("{operation} failed: {source}")]
    Io {
        operation: Operation,
        #[source]
        source: io::Error,
    },
}

impl ConnError {
    pub(crate) fn io(operation: Operation, source: io::Error) -> Self {
        ConnError::Io { operation, source }
    }

    /// The operation tag, when this is an I/O failure.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ConnError::Io { operation, .. } => Some(*operation),
            ConnError::Closed => None,
        }
    }
}

impl From<ConnError> for io::Error {
    fn from(err: ConnError) -> Self {
        let kind = match &err {
            ConnError::Closed => io::ErrorKind::NotConnected,
            ConnError::Io { source, .. } => source.kind(),
        };
        io::Error::new(kind, err)
    }
}

/// A failed attempt to dial the remote endpoint.
///
/// Never returned to callers: dial failures trigger backoff and another
/// attempt, and callers simply wait until a dial succeeds. The worker hands
/// these to the diagnostic sink instead.
#[derive(Debug, Error)]
#[error("failed to dial {address}: {source}")]
pub struct DialError {
    pub address: String,
    #[source]
    pub source: io::Error,
}

/// Errors that may occur while building a [`Conn`](crate::Conn).
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid connection configuration: {0}")]
    InvalidConfig(String),
}
