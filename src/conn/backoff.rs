//! Doubling backoff between failed dial attempts.

use std::time::Duration;

/// Tracks the delay before the next dial attempt.
///
/// Doubling applies only across consecutive dial failures within one
/// dialing episode; the supervisor resets the state on every successful
/// dial, so backoff never compounds across reconnects.
pub(crate) struct RetryState {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl RetryState {
    pub(crate) fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            current: min,
        }
    }

    /// The delay to sleep for now. Doubles the stored delay for the next
    /// failure, capped at the maximum.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub(crate) fn reset(&mut self) {
        self.current = self.min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_until_capped() {
        let mut retry = RetryState::new(Duration::from_secs(1), Duration::from_secs(8));
        let delays: Vec<u64> = (0..6).map(|_| retry.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 8, 8]);
    }

    #[test]
    fn reset_returns_to_minimum() {
        let mut retry = RetryState::new(Duration::from_secs(1), Duration::from_secs(8));
        retry.next_delay();
        retry.next_delay();
        retry.reset();
        assert_eq!(retry.next_delay(), Duration::from_secs(1));
        assert_eq!(retry.next_delay(), Duration::from_secs(2));
    }

    #[test]
    fn equal_bounds_pin_the_delay() {
        let mut retry = RetryState::new(Duration::from_millis(50), Duration::from_millis(50));
        assert_eq!(retry.next_delay(), Duration::from_millis(50));
        assert_eq!(retry.next_delay(), Duration::from_millis(50));
    }
}
