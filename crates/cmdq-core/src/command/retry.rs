//! Retry wrapper: bounded re-attempts of an inner operation.
//!
//! Only a transient inner failure consumes another attempt. Permanent and
//! exhausted failures pass through untouched, so a wrapper around another
//! wrapper (or around a composite whose retrying step gave up) never revives
//! an exhausted chain.

use serde::{Deserialize, Serialize};

use super::{Command, Operation};
use crate::domain::OperationError;

/// Lifecycle of a `RetryWrapper`.
///
/// State transitions:
/// - Idle -> Attempting (first dispatch)
/// - Attempting -> Attempting (failed, attempts < max)
/// - Attempting/Idle -> Exhausted (attempts == max)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryState {
    Idle,
    Attempting,
    Exhausted,
}

/// Wraps an operation and allows at most `max_attempts` executions of it.
///
/// Each `execute` call is exactly one attempt. The wrapper never loops on its
/// own; pacing belongs to whoever re-dispatches it (normally the
/// `CommandQueue`). A success does not reset the counter.
pub struct RetryWrapper {
    inner: Box<dyn Operation>,
    name: String,
    attempts: u32,
    max_attempts: u32,
}

impl RetryWrapper {
    /// `max_attempts` below 1 is raised to 1.
    pub fn new(inner: Box<dyn Operation>, max_attempts: u32) -> Self {
        let name = format!("Retry({})", inner.name());
        Self {
            inner,
            name,
            attempts: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Executions of the inner operation so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Upper bound on `attempts`, at least 1.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Name of the wrapped operation, without the `Retry(..)` decoration.
    pub fn inner_name(&self) -> &str {
        self.inner.name()
    }

    /// Derived from the counter; see [`RetryState`].
    pub fn state(&self) -> RetryState {
        if self.attempts >= self.max_attempts {
            RetryState::Exhausted
        } else if self.attempts == 0 {
            RetryState::Idle
        } else {
            RetryState::Attempting
        }
    }
}

impl Operation for RetryWrapper {
    fn name(&self) -> &str {
        &self.name
    }

    fn into_command(self: Box<Self>) -> Command {
        Command::Retry(*self)
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        if self.attempts >= self.max_attempts {
            return Err(OperationError::exhausted(
                self.inner.name(),
                format!("max retries reached for command: {}", self.inner.name()),
            )
            .into_exhausted(self.attempts));
        }

        self.attempts += 1;
        tracing::debug!(
            operation = self.inner.name(),
            attempt = self.attempts,
            max_attempts = self.max_attempts,
            "retrying command"
        );

        match self.inner.execute() {
            Ok(()) => Ok(()),
            // Permanent or already exhausted: terminal, keep the classification.
            Err(err) if !err.kind().is_retryable() => Err(err),
            Err(err) if self.attempts < self.max_attempts => {
                Err(err.into_retryable(self.attempts, self.max_attempts - self.attempts))
            }
            Err(err) => {
                tracing::warn!(
                    operation = self.inner.name(),
                    attempts = self.attempts,
                    "max retries reached"
                );
                Err(err.into_exhausted(self.attempts))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FnOperation;
    use crate::domain::FailureKind;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn always_transient(calls: Arc<AtomicU32>) -> Box<dyn Operation> {
        Box::new(FnOperation::new("flaky", move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(OperationError::transient("flaky", "still down"))
        }))
    }

    #[test]
    fn starts_idle() {
        let retry = RetryWrapper::new(always_transient(Arc::default()), 2);
        assert_eq!(retry.state(), RetryState::Idle);
        assert_eq!(retry.attempts(), 0);
        assert_eq!(retry.name(), "Retry(flaky)");
        assert_eq!(retry.inner_name(), "flaky");
    }

    #[rstest]
    #[case::one(1)]
    #[case::two(2)]
    #[case::five(5)]
    fn transient_until_bound_then_exhausted(#[case] max: u32) {
        let calls = Arc::new(AtomicU32::new(0));
        let mut retry = RetryWrapper::new(always_transient(calls.clone()), max);

        for attempt in 1..max {
            let err = retry.execute().unwrap_err();
            assert_eq!(err.kind(), FailureKind::Transient);
            assert_eq!(err.remaining_attempts(), Some(max - attempt));
            assert_eq!(retry.state(), RetryState::Attempting);
        }

        let err = retry.execute().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Exhausted);
        assert_eq!(err.attempts(), max);
        assert_eq!(err.operation(), "flaky");
        assert_eq!(retry.state(), RetryState::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), max);
    }

    #[test]
    fn exhausted_wrapper_does_not_call_inner() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut retry = RetryWrapper::new(always_transient(calls.clone()), 1);
        retry.execute().unwrap_err();

        let err = retry.execute().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Exhausted);
        assert!(err.message().contains("max retries reached"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(retry.attempts(), 1);
    }

    #[test]
    fn success_keeps_counter() {
        let mut retry = RetryWrapper::new(Box::new(FnOperation::new("ok", || Ok(()))), 3);
        retry.execute().unwrap();
        assert_eq!(retry.attempts(), 1);
        assert_eq!(retry.state(), RetryState::Attempting);
    }

    #[test]
    fn permanent_failure_is_not_reclassified() {
        let inner = FnOperation::new("broken", || Err(OperationError::permanent("broken", "bad input")));
        let mut retry = RetryWrapper::new(Box::new(inner), 3);
        let err = retry.execute().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Permanent);
    }

    #[test]
    fn exhausted_inner_failure_is_not_revived() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let inner = FnOperation::new("gave-up", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(OperationError::exhausted("gave-up", "no attempts left").into_exhausted(3))
        });
        let mut retry = RetryWrapper::new(Box::new(inner), 4);

        let err = retry.execute().unwrap_err();
        assert_eq!(err.kind(), FailureKind::Exhausted);
        assert_eq!(err.attempts(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn nested_wrapper_exhaustion_stops_outer_wrapper() {
        let calls = Arc::new(AtomicU32::new(0));
        let inner = RetryWrapper::new(always_transient(calls.clone()), 1);
        let mut outer = RetryWrapper::new(Box::new(inner), 3);

        // inner runs once and gives up
        assert_eq!(outer.execute().unwrap_err().kind(), FailureKind::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outer.name(), "Retry(Retry(flaky))");
    }

    #[test]
    fn zero_bound_is_clamped() {
        let retry = RetryWrapper::new(always_transient(Arc::default()), 0);
        assert_eq!(retry.max_attempts(), 1);
    }
}
