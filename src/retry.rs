//! Retry budget and reconnect backoff.

use std::time::Duration;

/// Reconnect policy
///
/// Internal type - users configure it via `retries` and `retry_backoff_ms` in `InputConfig`.
#[derive(Debug, Clone)]
pub(crate) struct RetryPolicy {
    /// Maximum number of consecutive transport failures
    max_retries: u32,
    /// Fixed pause between reconnect attempts
    backoff: Duration,
}

impl RetryPolicy {
    pub(crate) fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// A full budget for a new outer-loop iteration
    pub(crate) fn budget(&self) -> RetryBudget {
        RetryBudget::new(self.max_retries)
    }

    /// Pause before the next reconnect; constant, no growth and no jitter
    pub(crate) fn backoff(&self) -> Duration {
        self.backoff
    }

    pub(crate) fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1))
    }
}

/// Remaining retries before the input gives up
///
/// Always within `[0, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RetryBudget {
    max: u32,
    remaining: u32,
}

impl RetryBudget {
    pub(crate) fn new(max: u32) -> Self {
        Self {
            max,
            remaining: max,
        }
    }

    /// Restore the full budget after a confirmed resumption
    pub(crate) fn reset(&mut self) {
        self.remaining = self.max;
    }

    /// Spend one retry
    pub(crate) fn consume(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub(crate) fn remaining(&self) -> u32 {
        self.remaining
    }

    /// No retries left: the next failure is fatal
    pub(crate) fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries(), 5);
        assert_eq!(policy.backoff(), Duration::from_secs(1));
        assert_eq!(policy.budget().remaining(), 5);
    }

    #[test]
    fn test_backoff_is_fixed() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        let mut budget = policy.budget();

        while !budget.is_exhausted() {
            assert_eq!(policy.backoff(), Duration::from_millis(250));
            budget.consume();
        }
    }

    #[test]
    fn test_budget_decrements_by_one() {
        let mut budget = RetryBudget::new(3);
        budget.consume();
        assert_eq!(budget.remaining(), 2);
        budget.consume();
        assert_eq!(budget.remaining(), 1);
        budget.consume();
        assert_eq!(budget.remaining(), 0);
        assert!(budget.is_exhausted());
    }

    #[test]
    fn test_budget_never_goes_negative() {
        let mut budget = RetryBudget::new(1);
        budget.consume();
        budget.consume();
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_budget_reset() {
        let mut budget = RetryBudget::new(2);
        budget.consume();
        budget.consume();
        assert!(budget.is_exhausted());

        budget.reset();
        assert_eq!(budget.remaining(), 2);
        assert!(!budget.is_exhausted());
    }

    #[test]
    fn test_zero_budget_is_exhausted_immediately() {
        let budget = RetryBudget::new(0);
        assert!(budget.is_exhausted());
    }
}
