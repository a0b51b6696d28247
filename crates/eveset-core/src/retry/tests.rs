//! Executor behaviour across predicates, observers and policies

use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::retry::{ClosurePredicate, RetryError, RetryExecutor, RetryObserver};
use crate::types::{RetryPolicy, RetryStrategy};

#[derive(Default)]
struct Counts {
    attempts: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    rejections: AtomicU32,
}

/// Observer whose counters stay readable after the executor is consumed
struct Counting(Arc<Counts>);

impl RetryObserver for Counting {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.0.attempts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {
        self.0.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.0.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {}

    fn on_rejected(&self, _attempt: u32, _error: &dyn Error) {
        self.0.rejections.fetch_add(1, Ordering::SeqCst);
    }
}

fn immediate(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        strategy: RetryStrategy::None,
        initial_delay_ms: 0,
        max_delay_ms: 0,
    }
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let calls = AtomicU32::new(0);
    let result = RetryExecutor::new(immediate(3))
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, io::Error>("ok")
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_succeeds_after_transient_failures() {
    let calls = AtomicU32::new(0);
    let counts = Arc::new(Counts::default());

    let result = RetryExecutor::new(immediate(3))
        .with_observer(Counting(Arc::clone(&counts)))
        .execute(|| async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(io::Error::other("flaky"))
            } else {
                Ok(n)
            }
        })
        .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(counts.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(counts.failures.load(Ordering::SeqCst), 2);
    assert_eq!(counts.successes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhausted_after_max_attempts() {
    let calls = AtomicU32::new(0);
    let result: Result<(), _> = RetryExecutor::new(immediate(3))
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("down"))
        })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_exhausted());
    assert_eq!(err.attempts(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(err.to_string().contains("down"));
}

#[tokio::test]
async fn test_non_retryable_stops_immediately() {
    let calls = AtomicU32::new(0);
    let result: Result<(), _> = RetryExecutor::new(immediate(5))
        .with_predicate(ClosurePredicate::new(|e: &io::Error| {
            e.kind() == io::ErrorKind::TimedOut
        }))
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        })
        .await;

    assert!(matches!(
        result,
        Err(RetryError::NonRetryable { attempt: 1, .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejecting_predicate_reports_rejection() {
    let counts = Arc::new(Counts::default());
    let result: Result<(), _> = RetryExecutor::new(immediate(3))
        .with_predicate(ClosurePredicate::new(|_: &io::Error| false))
        .with_observer(Counting(Arc::clone(&counts)))
        .execute(|| async { Err(io::Error::other("nope")) })
        .await;

    assert!(!result.unwrap_err().is_exhausted());
    assert_eq!(counts.rejections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_zero_attempt_policy_still_runs_once() {
    let calls = AtomicU32::new(0);
    let result: Result<(), _> = RetryExecutor::new(immediate(0))
        .execute(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::other("x"))
        })
        .await;

    assert_eq!(result.unwrap_err().attempts(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fixed_delay_policy_completes() {
    let policy = RetryPolicy {
        max_attempts: 2,
        strategy: RetryStrategy::FixedDelay,
        initial_delay_ms: 1,
        max_delay_ms: 5,
    };
    let calls = AtomicU32::new(0);
    let result = RetryExecutor::new(policy)
        .execute(|| async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(io::Error::other("first"))
            } else {
                Ok(())
            }
        })
        .await;

    assert!(result.is_ok());
}
