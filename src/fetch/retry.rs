//! Retry policy for network calls
//!
//! The policy is plain data consumed by the fetcher, so the pause schedule
//! can be asserted in tests without real delays. The site tolerates a
//! fixed short pause between attempts; there is no exponential growth.

use std::time::Duration;

/// Bounded-retry policy with a fixed pause between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first
    pub max_attempts: u32,

    /// Pause before every attempt after the first
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, pause: Duration) -> Self {
        Self { max_attempts, pause }
    }

    /// Pause to take before the given 1-based attempt
    pub fn pause_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            Duration::ZERO
        } else {
            self.pause
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.pause, Duration::from_secs(1));
    }

    #[test]
    fn test_first_attempt_is_immediate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.pause_before(1), Duration::ZERO);
    }

    #[test]
    fn test_retries_pause_uniformly() {
        let policy = RetryPolicy::new(5, Duration::from_millis(250));
        for attempt in 2..=5 {
            assert_eq!(policy.pause_before(attempt), Duration::from_millis(250));
        }
    }
}
