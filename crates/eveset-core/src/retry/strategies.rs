//! Retry delay calculation and retry predicates

use crate::types::{RetryPolicy, RetryStrategy};
use std::time::Duration;

/// Delay to wait after attempt number `attempt` (1-indexed) fails
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let base_delay_ms = match policy.strategy {
        RetryStrategy::None => 0,
        RetryStrategy::FixedDelay => policy.initial_delay_ms,
        RetryStrategy::LinearBackoff => {
            policy.initial_delay_ms.saturating_mul(u64::from(attempt.max(1)))
        }
    };

    Duration::from_millis(base_delay_ms.min(policy.max_delay_ms))
}

/// Decides whether an error is worth another attempt
pub trait RetryPredicate<E>: Send + Sync {
    fn should_retry(&self, error: &E) -> bool;
}

/// Retries every error
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Wraps a closure as a predicate
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(strategy: RetryStrategy) -> RetryPolicy {
        RetryPolicy {
            max_attempts: 5,
            strategy,
            initial_delay_ms: 100,
            max_delay_ms: 250,
        }
    }

    #[test]
    fn test_no_delay_strategy() {
        let p = policy(RetryStrategy::None);
        assert_eq!(calculate_delay(&p, 1), Duration::ZERO);
        assert_eq!(calculate_delay(&p, 4), Duration::ZERO);
    }

    #[test]
    fn test_fixed_delay() {
        let p = policy(RetryStrategy::FixedDelay);
        assert_eq!(calculate_delay(&p, 1).as_millis(), 100);
        assert_eq!(calculate_delay(&p, 3).as_millis(), 100);
    }

    #[test]
    fn test_linear_backoff_is_capped() {
        let p = policy(RetryStrategy::LinearBackoff);
        assert_eq!(calculate_delay(&p, 1).as_millis(), 100);
        assert_eq!(calculate_delay(&p, 2).as_millis(), 200);
        assert_eq!(calculate_delay(&p, 3).as_millis(), 250);
    }

    #[test]
    fn test_closure_predicate() {
        let pred = ClosurePredicate::new(|code: &u16| *code >= 500);
        assert!(pred.should_retry(&503));
        assert!(!pred.should_retry(&404));
    }
}
