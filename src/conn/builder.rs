//! Builder assembling a connection's settings before it starts.

use std::{fmt, time::Duration};

use crate::diagnostics::DiagnosticSink;
use crate::error::BuildError;

use super::{config::ConnConfig, handle::Conn};

/// Configures and starts a [`Conn`].
///
/// Every setting except the address has a default; see the constants in
/// this module's parent. Validation happens in [`build`](ConnBuilder::build)
/// and a rejected configuration spawns no background thread.
///
/// ```no_run
/// use std::time::Duration;
/// use perconn::Conn;
///
/// let conn = Conn::builder("echo-server.example.com:7")
///     .dial_timeout(Duration::from_secs(5))
///     .retry_min(Duration::from_secs(1))
///     .retry_max(Duration::from_secs(30))
///     .build()?;
/// # Ok::<(), perconn::BuildError>(())
/// ```
pub struct ConnBuilder {
    config: ConnConfig,
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl ConnBuilder {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            config: ConnConfig {
                address: address.into(),
                ..ConnConfig::default()
            },
            sink: None,
        }
    }

    /// Bound each dial attempt. `Duration::ZERO` removes the bound.
    pub fn dial_timeout(mut self, timeout: Duration) -> Self {
        self.config.dial_timeout = timeout;
        self
    }

    /// Minimum delay between reconnection attempts.
    pub fn retry_min(mut self, delay: Duration) -> Self {
        self.config.retry_min = delay;
        self
    }

    /// Maximum delay between reconnection attempts.
    pub fn retry_max(mut self, delay: Duration) -> Self {
        self.config.retry_max = delay;
        self
    }

    /// Capacity of the bounded job queue.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Install a sink notified of dial and I/O failures. Without one,
    /// failures still reach the `log` crate as warnings.
    pub fn diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validate the configuration and start the connection worker.
    pub fn build(self) -> Result<Conn, BuildError> {
        self.config.validate()?;
        Ok(Conn::spawn(self.config, self.sink))
    }
}

impl fmt::Debug for ConnBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnBuilder")
            .field("config", &self.config)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
