//! Public connection handle.

use std::{fmt, io, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use log::warn;
use parking_lot::Mutex;
use std::thread::JoinHandle;

use crate::diagnostics::{DiagnosticSink, Diagnostics};
use crate::error::ConnError;

use super::{
    config::ConnConfig,
    job::Job,
    transport::{Dialer, TcpDialer},
    worker::{spawn_worker, WorkerChannels, WorkerConfig},
};

/// How long `Drop` waits for the worker thread to acknowledge shutdown
/// before detaching from it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// A pseudo-persistent connection to a single remote TCP endpoint.
///
/// The handle is `Send + Sync`: any number of threads may call [`read`],
/// [`write`], and [`close`] concurrently. Every operation becomes a job on a
/// bounded queue drained by one worker thread that exclusively owns the
/// live socket, so operations execute one at a time in queue order and no
/// caller ever observes a half-reconnected socket. Pushing onto a full
/// queue blocks the caller; that is the backpressure mechanism.
///
/// Reconnection is invisible: when the link breaks, the failing job gets
/// its error and the worker redials in the background while later jobs
/// wait. Only [`close`] ends the connection for good.
///
/// [`read`]: Conn::read
/// [`write`]: Conn::write
/// [`close`]: Conn::close
pub struct Conn {
    jobs: Option<Sender<Job>>,
    // Never sent on; dropping it wakes the worker's backoff sleeps.
    stop: Option<Sender<()>>,
    done: Receiver<()>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Conn {
    /// Start configuring a connection to `address`.
    pub fn builder(address: impl Into<String>) -> super::builder::ConnBuilder {
        super::builder::ConnBuilder::new(address)
    }

    pub(crate) fn spawn(config: ConnConfig, sink: Option<Box<dyn DiagnosticSink>>) -> Self {
        let diagnostics = Diagnostics::new(config.address.clone(), sink);
        let dialer = TcpDialer::new(config.address.clone(), config.dial_timeout);
        Self::start(dialer, WorkerConfig::from(&config), diagnostics)
    }

    /// Wire a facade to a freshly spawned worker. The dialer seam is what
    /// lets tests drive the worker with scripted connections.
    pub(crate) fn start<D>(dialer: D, config: WorkerConfig, diagnostics: Diagnostics) -> Self
    where
        D: Dialer + 'static,
    {
        let WorkerChannels {
            jobs,
            stop,
            done,
            handle,
        } = spawn_worker(dialer, config, diagnostics);
        Self {
            jobs: Some(jobs),
            stop: Some(stop),
            done,
            worker: Mutex::new(Some(handle)),
        }
    }

    /// Read bytes from the connection into `buf`.
    ///
    /// Blocks until the worker has executed the read against the live
    /// socket (dialing first if necessary) and returns the byte count. An
    /// I/O failure is returned as [`ConnError::Io`] tagged with
    /// [`Operation::Read`](crate::Operation::Read) and tears the link down
    /// for redial; after [`close`](Conn::close) this returns
    /// [`ConnError::Closed`].
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, ConnError> {
        let (job, reply) = Job::read(buf.len());
        self.submit(job)?;
        let reply = reply.recv().map_err(|_| ConnError::Closed)?;
        let n = reply.result?;
        buf[..n].copy_from_slice(&reply.buf[..n]);
        Ok(n)
    }

    /// Write `data` to the connection, returning the byte count the socket
    /// accepted. Error behavior mirrors [`read`](Conn::read).
    pub fn write(&self, data: &[u8]) -> Result<usize, ConnError> {
        let (job, reply) = Job::write(data.to_vec());
        self.submit(job)?;
        reply.recv().map_err(|_| ConnError::Closed)?
    }

    /// Close the connection permanently.
    ///
    /// The worker shuts the live socket down, never redials, and keeps
    /// answering any later job with [`ConnError::Closed`]. Calling `close`
    /// again also returns [`ConnError::Closed`].
    pub fn close(&self) -> Result<(), ConnError> {
        let (job, reply) = Job::close();
        self.submit(job)?;
        reply.recv().map_err(|_| ConnError::Closed)?
    }

    fn submit(&self, job: Job) -> Result<(), ConnError> {
        let Some(jobs) = &self.jobs else {
            return Err(ConnError::Closed);
        };
        // Blocks while the queue is full. Send only fails if the worker is
        // gone, which callers observe as a closed connection.
        jobs.send(job).map_err(|_| ConnError::Closed)
    }
}

impl io::Read for Conn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Conn::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Write for Conn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Conn::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Writes go straight to the socket; there is no crate-side buffer.
        Ok(())
    }
}

impl Drop for Conn {
    fn drop(&mut self) {
        self.jobs.take();
        self.stop.take();
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        if self.done.recv_timeout(SHUTDOWN_TIMEOUT).is_err() {
            // Blocked in socket I/O; the thread exits on its own once the
            // call returns.
            warn!("perconn: worker thread did not shut down within {SHUTDOWN_TIMEOUT:?}");
            return;
        }
        if handle.join().is_err() {
            warn!("perconn: worker thread panicked");
        }
    }
}

impl fmt::Debug for Conn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conn")
            .field("closed_handle", &self.jobs.is_none())
            .finish()
    }
}
