//! Retry classification and exponential backoff

use crate::config::RetryConfig;
use std::collections::HashSet;
use std::time::Duration;

/// How transient failures are recognized and how long to back off
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single backoff
    pub max_backoff: Duration,
    retryable_statuses: HashSet<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            retryable_statuses: config.retryable_status.iter().copied().collect(),
        }
    }

    /// Whether a response status is worth another attempt
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Backoff before retry number `retry` (1-based): `initial * 2^(retry-1)`, capped
    pub fn calculate_backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Whether another attempt is allowed after `attempts` attempts
    pub fn should_retry(&self, attempts: u32, dont_retry: bool) -> bool {
        !dont_retry && attempts <= self.max_retries
    }

    /// Maximum number of attempts for one task
    pub fn max_attempts(&self, dont_retry: bool) -> u32 {
        if dont_retry {
            1
        } else {
            self.max_retries + 1
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_backoff_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.calculate_backoff(1), Duration::from_secs(1));
        assert_eq!(policy.calculate_backoff(2), Duration::from_secs(2));
        assert_eq!(policy.calculate_backoff(3), Duration::from_secs(4));
    }

    #[test]
    fn test_calculate_backoff_max_limit() {
        let policy = RetryPolicy {
            max_backoff: Duration::from_secs(5),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.calculate_backoff(10), Duration::from_secs(5));
        assert_eq!(policy.calculate_backoff(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::default();

        // max_retries = 3 allows four attempts in total
        assert!(policy.should_retry(1, false));
        assert!(policy.should_retry(3, false));
        assert!(!policy.should_retry(4, false));
        assert_eq!(policy.max_attempts(false), 4);
    }

    #[test]
    fn test_dont_retry_means_single_attempt() {
        let policy = RetryPolicy::default();
        assert!(!policy.should_retry(1, true));
        assert_eq!(policy.max_attempts(true), 1);
    }

    #[test]
    fn test_retryable_statuses() {
        let policy = RetryPolicy::default();
        for status in [500, 502, 503, 504, 408, 429] {
            assert!(policy.is_retryable_status(status));
        }
        assert!(!policy.is_retryable_status(404));
        assert!(!policy.is_retryable_status(501));
    }
}
