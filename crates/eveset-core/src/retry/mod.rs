//! Retry execution engine with policy-based configuration
//!
//! Operations are retried according to a [`RetryPolicy`](crate::types::RetryPolicy)
//! loaded from runtime config. A [`RetryPredicate`] decides which errors are
//! worth another attempt and a [`RetryObserver`] sees every attempt.
//!
//! ```rust,no_run
//! use eveset_core::retry::{ClosurePredicate, RetryExecutor, TracingObserver};
//! use eveset_core::types::RetryPolicy;
//!
//! async fn example() {
//!     let executor = RetryExecutor::new(RetryPolicy::default())
//!         .with_predicate(ClosurePredicate::new(|e: &std::io::Error| {
//!             e.kind() == std::io::ErrorKind::TimedOut
//!         }))
//!         .with_observer(TracingObserver::new("lookup"));
//!
//!     let result = executor.execute(|| async { Ok::<_, std::io::Error>(42) }).await;
//!     assert_eq!(result.unwrap(), 42);
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::RetryExecutor;
pub use observer::{NoOpObserver, RetryObserver, TracingObserver};
pub use strategies::{calculate_delay, AlwaysRetry, ClosurePredicate, RetryPredicate};

#[cfg(test)]
mod tests;
