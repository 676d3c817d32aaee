//! Retry policy shared by the HTTP layer and its configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Exponential backoff policy for idempotent requests.
///
/// `max_retries` counts retries after the first attempt, so a request is
/// sent at most `max_retries + 1` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_ms: u64,
    pub max_ms: u64,
    pub multiplier: f64,
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_ms: 100,
            max_ms: 2_000,
            multiplier: 2.0,
            jitter_ms: 20,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Base delay before retry number `retry` (0-based), without jitter.
    ///
    /// `initial_ms * multiplier^retry`, capped at `max_ms`.
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(retry.min(i32::MAX as u32) as i32);
        let millis = (self.initial_ms as f64 * factor).min(self.max_ms as f64);
        Duration::from_millis(millis as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_matches_client_contract() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_retries, 3);
        assert_eq!(retry.base_delay(0), Duration::from_millis(100));
        assert_eq!(retry.base_delay(1), Duration::from_millis(200));
        assert_eq!(retry.base_delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_capped() {
        let retry = RetryConfig::default();
        assert_eq!(retry.base_delay(30), Duration::from_millis(2_000));
    }

    proptest! {
        #[test]
        fn backoff_never_decreases(
            initial in 1u64..500,
            extra in 0u64..5_000,
            multiplier in 1.0f64..4.0f64,
            retry in 0u32..10,
        ) {
            let config = RetryConfig {
                max_retries: 10,
                initial_ms: initial,
                max_ms: initial + extra,
                multiplier,
                jitter_ms: 0,
            };
            prop_assert!(config.base_delay(retry) <= config.base_delay(retry + 1));
            prop_assert!(config.base_delay(retry) <= Duration::from_millis(config.max_ms));
        }
    }
}
