//! Scripted streams and dialers driving the worker in tests.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::diagnostics::{DiagnosticSink, Diagnostics};

use super::config::DEFAULT_QUEUE_CAPACITY;
use super::handle::Conn;
use super::transport::{Dialer, Stream};
use super::worker::WorkerConfig;

#[derive(Default)]
struct StreamState {
    written: Vec<Vec<u8>>,
    readable: VecDeque<Vec<u8>>,
    next_read_error: Option<io::ErrorKind>,
    next_write_error: Option<io::ErrorKind>,
    shutdown_error: Option<io::ErrorKind>,
    shutdowns: usize,
}

/// In-memory stream recording every call the worker makes against it.
///
/// Cloning shares state, so tests keep one clone and hand the other to the
/// dialer script. The busy flag trips if two operations ever overlap,
/// which the single-owner design must make impossible.
#[derive(Clone, Default)]
pub(crate) struct MockStream {
    state: Arc<Mutex<StreamState>>,
    busy: Arc<AtomicBool>,
    overlapped: Arc<AtomicBool>,
}

impl MockStream {
    pub(crate) fn push_readable(&self, bytes: &[u8]) {
        self.state.lock().readable.push_back(bytes.to_vec());
    }

    pub(crate) fn fail_next_read(&self, kind: io::ErrorKind) {
        self.state.lock().next_read_error = Some(kind);
    }

    pub(crate) fn fail_next_write(&self, kind: io::ErrorKind) {
        self.state.lock().next_write_error = Some(kind);
    }

    pub(crate) fn fail_shutdown(&self, kind: io::ErrorKind) {
        self.state.lock().shutdown_error = Some(kind);
    }

    pub(crate) fn written(&self) -> Vec<Vec<u8>> {
        self.state.lock().written.clone()
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.state.lock().shutdowns
    }

    pub(crate) fn saw_overlapping_io(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    fn enter(&self) -> BusyGuard<'_> {
        if self.busy.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        // Widen the window so overlapping callers would actually collide.
        std::thread::sleep(Duration::from_micros(200));
        BusyGuard(self)
    }
}

struct BusyGuard<'a>(&'a MockStream);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::SeqCst);
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let _busy = self.enter();
        let mut state = self.state.lock();
        if let Some(kind) = state.next_read_error.take() {
            return Err(io::Error::new(kind, "scripted read failure"));
        }
        match state.readable.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            // No staged data reads as end-of-stream.
            None => Ok(0),
        }
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _busy = self.enter();
        let mut state = self.state.lock();
        if let Some(kind) = state.next_write_error.take() {
            return Err(io::Error::new(kind, "scripted write failure"));
        }
        state.written.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Stream for MockStream {
    fn shutdown(&mut self) -> io::Result<()> {
        let mut state = self.state.lock();
        state.shutdowns += 1;
        match state.shutdown_error.take() {
            Some(kind) => Err(io::Error::new(kind, "scripted shutdown failure")),
            None => Ok(()),
        }
    }
}

/// One step of a dial script.
pub(crate) enum DialStep {
    Serve(MockStream),
    Refuse,
}

/// Dialer following a fixed script; an exhausted script keeps refusing.
pub(crate) struct ScriptedDialer {
    script: Mutex<VecDeque<DialStep>>,
    dials: Arc<AtomicUsize>,
}

impl ScriptedDialer {
    pub(crate) fn new(steps: Vec<DialStep>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            dials: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter shared with the worker; read it after operations complete.
    pub(crate) fn dial_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.dials)
    }
}

impl Dialer for ScriptedDialer {
    type Stream = MockStream;

    fn dial(&mut self) -> io::Result<MockStream> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front() {
            Some(DialStep::Serve(stream)) => Ok(stream),
            Some(DialStep::Refuse) | None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "scripted refusal",
            )),
        }
    }
}

/// Sink collecting every reported message.
#[derive(Clone, Default)]
pub(crate) struct CollectingSink(Arc<Mutex<Vec<String>>>);

impl CollectingSink {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, message: &str) {
        self.0.lock().push(message.to_owned());
    }
}

/// Wire a facade to a worker driven by the scripted dialer.
pub(crate) fn conn_with_dialer(
    dialer: ScriptedDialer,
    retry_min: Duration,
    retry_max: Duration,
    sink: Option<Box<dyn DiagnosticSink>>,
) -> Conn {
    let config = WorkerConfig {
        queue_capacity: DEFAULT_QUEUE_CAPACITY,
        retry_min,
        retry_max,
    };
    Conn::start(dialer, config, Diagnostics::new("mock:0".into(), sink))
}
