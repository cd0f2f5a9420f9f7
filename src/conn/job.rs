//! Job and reply types flowing between the facade and the worker.
//!
//! Each job carries its own single-slot reply channel, created at
//! construction. Exactly one reply is ever produced per job, by whichever
//! loop ends up answering it: the owner loop while a socket is live, or the
//! post-close drain afterwards.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::error::ConnError;

/// Reply to a read job. The destination buffer travels to the worker so the
/// socket reads directly into it, then comes back to the caller.
#[derive(Debug)]
pub(crate) struct ReadReply {
    pub buf: Vec<u8>,
    pub result: Result<usize, ConnError>,
}

pub(crate) type WriteReply = Result<usize, ConnError>;
pub(crate) type CloseReply = Result<(), ConnError>;

/// One queued operation against the connection.
#[derive(Debug)]
pub(crate) enum Job {
    Read {
        buf: Vec<u8>,
        reply: Sender<ReadReply>,
    },
    Write {
        data: Vec<u8>,
        reply: Sender<WriteReply>,
    },
    Close {
        reply: Sender<CloseReply>,
    },
}

impl Job {
    /// Build a read job with a destination buffer of `len` bytes.
    pub(crate) fn read(len: usize) -> (Self, Receiver<ReadReply>) {
        let (reply, rx) = bounded(1);
        (
            Job::Read {
                buf: vec![0; len],
                reply,
            },
            rx,
        )
    }

    pub(crate) fn write(data: Vec<u8>) -> (Self, Receiver<WriteReply>) {
        let (reply, rx) = bounded(1);
        (Job::Write { data, reply }, rx)
    }

    pub(crate) fn close() -> (Self, Receiver<CloseReply>) {
        let (reply, rx) = bounded(1);
        (Job::Close { reply }, rx)
    }

    /// Answer the job with [`ConnError::Closed`]. Used by the drain that
    /// keeps consuming the queue after a user-initiated close so late
    /// submitters get a terminal answer instead of blocking forever.
    pub(crate) fn reject_closed(self) {
        match self {
            Job::Read { buf, reply } => {
                let _ = reply.send(ReadReply {
                    buf,
                    result: Err(ConnError::Closed),
                });
            }
            Job::Write { reply, .. } => {
                let _ = reply.send(Err(ConnError::Closed));
            }
            Job::Close { reply } => {
                let _ = reply.send(Err(ConnError::Closed));
            }
        }
    }
}
