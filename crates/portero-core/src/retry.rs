//! Retry policy with linear backoff.
//!
//! Kept as a small standalone state machine (attempt counter plus delay
//! schedule) so the transport loop in `portero-backend` stays trivially
//! testable. Classification of what is retryable lives with
//! [`crate::ErrorCategory::is_retryable`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Linear-backoff retry configuration.
///
/// `max_retries` counts *additional* attempts after the first one, so a
/// policy with `max_retries = 2` allows three attempts in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Additional attempts allowed after the initial one.
    pub max_retries: u32,
    /// Delay before the first retry; grows linearly per attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Whether another attempt is allowed after `failed_attempts`
    /// attempts have already failed (0-based index of the failure).
    #[must_use]
    pub fn should_retry(&self, failed_attempts: u32) -> bool {
        failed_attempts < self.max_retries
    }

    /// Delay to sleep before retry number `attempt` (1-based).
    ///
    /// Grows linearly: `base_delay * attempt`. Attempt 0 is the initial
    /// call and carries no delay.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Total number of attempts this policy allows.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    /// The original deployment's defaults: 2 retries, 300ms steps.
    fn default() -> Self {
        Self::new(2, Duration::from_millis(300))
    }
}
