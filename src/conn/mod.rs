//! Persistent connection implementation.
//!
//! The facade ([`Conn`]) turns each read/write/close call into a job on a
//! bounded queue. A dedicated worker thread drains that queue: its
//! supervisor dials the remote endpoint with bounded exponential backoff
//! and hands each established socket to an owner loop that executes jobs
//! against it one at a time. Callers never touch the socket and never race
//! each other; reconnection shows up only as latency.

mod backoff;
mod builder;
mod config;
mod handle;
mod job;
mod transport;
mod worker;

#[cfg(test)]
mod test_support;

pub use builder::ConnBuilder;
pub use config::{
    ConnConfig, DEFAULT_DIAL_TIMEOUT, DEFAULT_QUEUE_CAPACITY, DEFAULT_RETRY_MAX,
    DEFAULT_RETRY_MIN,
};
pub use handle::Conn;
