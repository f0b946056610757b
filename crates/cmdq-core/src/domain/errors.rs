//! Errors - classified failures raised by operations.
//!
//! Every failure an [`Operation`](crate::command::Operation) can produce carries a
//! [`FailureKind`]. The command queue decides between "retry" and "record" by
//! looking at that kind only; it never inspects messages or concrete error types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// FailureKind classifies an execution failure.
///
/// - Transient: may succeed if re-dispatched later.
/// - Exhausted: the retry bound has been reached. Terminal, must be recorded.
/// - Permanent: not retryable by nature (broken invariant, unreadable state, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transient,
    Exhausted,
    Permanent,
}

impl FailureKind {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureKind::Transient)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Transient => "transient",
            FailureKind::Exhausted => "exhausted",
            FailureKind::Permanent => "permanent",
        };
        f.write_str(s)
    }
}

/// OperationError is the failure value returned by `Operation::execute`.
///
/// `operation` is the name of the operation the failure originated in. Wrappers
/// keep that name when they reclassify, so a record produced after a retry still
/// names the command that actually failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} failure in {operation}: {message}")]
pub struct OperationError {
    kind: FailureKind,
    operation: String,
    message: String,
    attempts: u32,
    remaining_attempts: Option<u32>,
    #[source]
    cause: Option<Box<OperationError>>,
}

impl OperationError {
    pub fn new(kind: FailureKind, operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation: operation.into(),
            message: message.into(),
            attempts: 1,
            remaining_attempts: None,
            cause: None,
        }
    }

    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transient, operation, message)
    }

    pub fn permanent(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Permanent, operation, message)
    }

    pub fn exhausted(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Exhausted, operation, message)
    }

    /// Reclassify as transient, noting how many attempts are left.
    pub fn into_retryable(mut self, attempts: u32, remaining: u32) -> Self {
        self.kind = FailureKind::Transient;
        self.attempts = attempts;
        self.remaining_attempts = Some(remaining);
        self
    }

    /// Reclassify as exhausted after `attempts` tries.
    pub fn into_exhausted(mut self, attempts: u32) -> Self {
        self.kind = FailureKind::Exhausted;
        self.attempts = attempts;
        self.remaining_attempts = None;
        self
    }

    /// Attach the member failure that caused this one.
    pub fn caused_by(mut self, cause: OperationError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attempts made when this failure was observed (1 for a plain execution).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn remaining_attempts(&self) -> Option<u32> {
        self.remaining_attempts
    }

    pub fn cause(&self) -> Option<&OperationError> {
        self.cause.as_deref()
    }
}
