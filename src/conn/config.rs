//! Configuration for a persistent connection.
//!
//! Defaults live here as named constants so callers and tests can reference
//! them instead of repeating magic numbers. Validation happens once, at
//! build time; a rejected configuration starts no background activity.

use std::time::Duration;

use crate::error::BuildError;

/// Default bounded job queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;
/// Default bound on dial latency.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);
/// Default minimum delay between reconnection attempts.
pub const DEFAULT_RETRY_MIN: Duration = Duration::from_secs(1);
/// Default maximum delay between reconnection attempts.
pub const DEFAULT_RETRY_MAX: Duration = Duration::from_secs(60);

/// Validated settings consumed by the connection worker.
#[derive(Clone, Debug)]
pub struct ConnConfig {
    /// Remote endpoint, `host:port`. Required.
    pub address: String,
    /// Bound on each dial attempt. Zero means an unbounded dial.
    pub dial_timeout: Duration,
    /// Delay before the first redial, and the floor the backoff resets to.
    pub retry_min: Duration,
    /// Cap on the doubling backoff delay.
    pub retry_max: Duration,
    /// Capacity of the bounded job queue; producers block when it is full.
    pub queue_capacity: usize,
}

impl Default for ConnConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            retry_min: DEFAULT_RETRY_MIN,
            retry_max: DEFAULT_RETRY_MAX,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ConnConfig {
    pub(crate) fn validate(&self) -> Result<(), BuildError> {
        if self.address.is_empty() {
            return Err(BuildError::InvalidConfig(
                "address must not be empty".into(),
            ));
        }
        if self.retry_min.is_zero() {
            return Err(BuildError::InvalidConfig(
                "retry_min must be greater than zero".into(),
            ));
        }
        if self.retry_max.is_zero() {
            return Err(BuildError::InvalidConfig(
                "retry_max must be greater than zero".into(),
            ));
        }
        if self.retry_max < self.retry_min {
            return Err(BuildError::InvalidConfig(format!(
                "retry_max ({:?}) must not be less than retry_min ({:?})",
                self.retry_max, self.retry_min
            )));
        }
        if self.queue_capacity == 0 {
            return Err(BuildError::InvalidConfig(
                "queue_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
