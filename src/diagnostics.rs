//! Diagnostic sink contract and the worker's failure reporter.
//!
//! A sink is an optional collaborator notified whenever a dial or an I/O
//! operation fails. It is never invoked for successful operations, and
//! never for [`ConnError::Closed`](crate::ConnError::Closed) rejections —
//! those are an expected condition for the caller, not a fault.

use log::warn;

use crate::error::{ConnError, DialError};

/// Receives pre-formatted failure messages from the connection worker.
///
/// Absence of a sink is a no-op, never an error. Implementations must be
/// cheap or hand off quickly: they run on the worker thread between jobs.
pub trait DiagnosticSink: Send {
    /// Record one failure message.
    fn report(&self, message: &str);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&str) + Send,
{
    fn report(&self, message: &str) {
        self(message);
    }
}

/// Sink forwarding every failure to [`log::warn!`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, message: &str) {
        warn!("{message}");
    }
}

/// Failure reporter owned by the worker thread.
///
/// Formats structured errors once and fans them out: always to the `log`
/// crate, and to the configured sink when present.
pub(crate) struct Diagnostics {
    address: String,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl Diagnostics {
    pub(crate) fn new(address: String, sink: Option<Box<dyn DiagnosticSink>>) -> Self {
        Self { address, sink }
    }

    pub(crate) fn dial_failed(&self, source: std::io::Error) {
        let err = DialError {
            address: self.address.clone(),
            source,
        };
        self.emit(&err.to_string());
    }

    pub(crate) fn io_failed(&self, err: &ConnError) {
        // Closed is not a fault; only tagged I/O failures are reported.
        if matches!(err, ConnError::Io { .. }) {
            self.emit(&err.to_string());
        }
    }

    fn emit(&self, message: &str) {
        warn!("perconn: {message}");
        if let Some(sink) = &self.sink {
            sink.report(message);
        }
    }
}
