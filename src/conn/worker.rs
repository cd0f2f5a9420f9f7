//! Worker thread owning the live socket.
//!
//! One dedicated thread runs the supervisor for the whole life of a
//! [`Conn`](crate::Conn): it dials the remote endpoint, hands each
//! established stream to the owner loop, and redials with backoff when the
//! link breaks. The owner loop is the only code that ever touches a stream,
//! which rules out data races on the socket without any locking.

use std::{
    io,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::diagnostics::Diagnostics;
use crate::error::{ConnError, Operation};

use super::{
    backoff::RetryState,
    config::ConnConfig,
    job::{Job, ReadReply},
    transport::{Dialer, Stream},
};

/// Settings the worker needs, copied out of [`ConnConfig`].
pub(crate) struct WorkerConfig {
    pub queue_capacity: usize,
    pub retry_min: Duration,
    pub retry_max: Duration,
}

impl From<&ConnConfig> for WorkerConfig {
    fn from(cfg: &ConnConfig) -> Self {
        Self {
            queue_capacity: cfg.queue_capacity,
            retry_min: cfg.retry_min,
            retry_max: cfg.retry_max,
        }
    }
}

/// Channel ends handed back to the facade.
///
/// `stop` is never sent on; the facade holds it so that dropping the facade
/// disconnects the channel and wakes any backoff sleep. The worker signals
/// `done` just before its thread exits.
pub(crate) struct WorkerChannels {
    pub jobs: Sender<Job>,
    pub stop: Sender<()>,
    pub done: Receiver<()>,
    pub handle: JoinHandle<()>,
}

/// How one owner-loop tenancy over a stream ended.
enum LinkOutcome {
    /// An I/O error tore the link down; the supervisor redials.
    Broken,
    /// The user closed the connection; terminal.
    UserClosed,
    /// Every facade handle was dropped; the worker exits.
    Detached,
}

pub(crate) fn spawn_worker<D>(
    dialer: D,
    config: WorkerConfig,
    diagnostics: Diagnostics,
) -> WorkerChannels
where
    D: Dialer + 'static,
{
    let (jobs_tx, jobs_rx) = bounded(config.queue_capacity);
    let (stop_tx, stop_rx) = bounded(0);
    let (done_tx, done_rx) = bounded(1);
    let handle = thread::spawn(move || {
        supervise(dialer, &jobs_rx, &stop_rx, &config, &diagnostics);
        let _ = done_tx.send(());
    });
    WorkerChannels {
        jobs: jobs_tx,
        stop: stop_tx,
        done: done_rx,
        handle,
    }
}

/// Reconnect state machine: Dialing -> Connected -> (Broken -> Dialing |
/// UserClosed -> drain | Detached -> exit).
fn supervise<D: Dialer>(
    mut dialer: D,
    jobs: &Receiver<Job>,
    stop: &Receiver<()>,
    config: &WorkerConfig,
    diagnostics: &Diagnostics,
) {
    let mut retry = RetryState::new(config.retry_min, config.retry_max);
    loop {
        let mut stream = loop {
            match dialer.dial() {
                Ok(stream) => {
                    retry.reset();
                    break stream;
                }
                Err(err) => {
                    diagnostics.dial_failed(err);
                    if !sleep_unless_stopped(stop, retry.next_delay()) {
                        return;
                    }
                }
            }
        };
        match serve(jobs, &mut stream, diagnostics) {
            LinkOutcome::Broken => {
                // A broken live connection always waits the minimum interval
                // before the next dial attempt, never a grown backoff delay.
                if !sleep_unless_stopped(stop, config.retry_min) {
                    return;
                }
            }
            LinkOutcome::UserClosed => {
                reject_after_close(jobs);
                return;
            }
            LinkOutcome::Detached => return,
        }
    }
}

/// Owner loop: executes jobs against the stream one at a time, in queue
/// order, until the link breaks, the user closes it, or the facade is gone.
fn serve<S: Stream>(
    jobs: &Receiver<Job>,
    stream: &mut S,
    diagnostics: &Diagnostics,
) -> LinkOutcome {
    for job in jobs {
        match job {
            Job::Read { mut buf, reply } => {
                match read_stream(stream, &mut buf) {
                    Ok(n) => {
                        let _ = reply.send(ReadReply {
                            buf,
                            result: Ok(n),
                        });
                    }
                    Err(source) => {
                        let err = ConnError::io(Operation::Read, source);
                        diagnostics.io_failed(&err);
                        let _ = reply.send(ReadReply {
                            buf,
                            result: Err(err),
                        });
                        let _ = stream.shutdown();
                        return LinkOutcome::Broken;
                    }
                }
            }
            Job::Write { data, reply } => match stream.write(&data) {
                Ok(n) => {
                    let _ = reply.send(Ok(n));
                }
                Err(source) => {
                    let err = ConnError::io(Operation::Write, source);
                    diagnostics.io_failed(&err);
                    let _ = reply.send(Err(err));
                    let _ = stream.shutdown();
                    return LinkOutcome::Broken;
                }
            },
            Job::Close { reply } => {
                let result = stream
                    .shutdown()
                    .map_err(|source| ConnError::io(Operation::Close, source));
                if let Err(err) = &result {
                    diagnostics.io_failed(err);
                }
                let _ = reply.send(result);
                return LinkOutcome::UserClosed;
            }
        }
    }
    LinkOutcome::Detached
}

/// Read into the job's buffer. A zero-length read into a non-empty buffer
/// means the peer closed the connection; surface it as an error so the
/// supervisor redials instead of handing callers empty reads forever.
fn read_stream<S: Stream>(stream: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    match stream.read(buf) {
        Ok(0) if !buf.is_empty() => Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by peer",
        )),
        other => other,
    }
}

/// After a user-initiated close the queue keeps being drained so that jobs
/// submitted late still receive a terminal answer instead of blocking
/// forever. Runs until the facade drops its sender.
fn reject_after_close(jobs: &Receiver<Job>) {
    for job in jobs {
        job.reject_closed();
    }
}

/// Sleep for `delay`, waking early if the facade has been dropped. Returns
/// false when the worker should exit instead of continuing.
fn sleep_unless_stopped(stop: &Receiver<()>, delay: Duration) -> bool {
    matches!(stop.recv_timeout(delay), Err(RecvTimeoutError::Timeout))
}
