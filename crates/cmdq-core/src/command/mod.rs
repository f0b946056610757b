//! Command module: operations, wrappers, and the draining command queue.
//!
//! # Building blocks
//!
//! - [`Operation`]: a named unit of work that can fail with an [`OperationError`].
//! - [`CompositeOperation`]: ordered sequence, halts at the first failure.
//! - [`RetryWrapper`]: bounded re-attempts, one attempt per dispatch.
//! - [`FailureRecorder`]: terminal sink for a failure, never fails itself.
//! - [`CommandQueue`]: FIFO drain with failure classification and re-dispatch.
//!
//! # Routing
//!
//! The queue stores a closed [`Command`] enum rather than bare trait objects.
//! Wrappers and recorders land in their own variants no matter how they were
//! handed in (`enqueue`, `enqueue_retry` or `push`), because
//! [`Operation::into_command`] is overridden by those two types. That is what
//! lets a transiently failing wrapper go back on the queue as the same value,
//! with its attempt counter intact.
//!
//! A `Box<dyn Operation>` has already lost its concrete type, so it is always
//! stored as [`Command::Op`]. Pass wrappers by value.

mod composite;
mod queue;
mod recorder;
mod retry;

pub use composite::CompositeOperation;
pub use queue::{CommandQueue, CommandQueueBuilder};
pub use recorder::FailureRecorder;
pub use retry::{RetryState, RetryWrapper};

use crate::domain::OperationError;

/// A named, executable unit of work.
///
/// `execute` takes `&mut self` so an operation can keep state between
/// dispatches (a retry counter, a "fail the first N times" probe, ...).
pub trait Operation: Send {
    /// Diagnostic name. Not required to be unique.
    fn name(&self) -> &str;

    fn execute(&mut self) -> Result<(), OperationError>;

    /// How the command queue should hold this operation.
    ///
    /// Plain operations become [`Command::Op`]. `RetryWrapper` and
    /// `FailureRecorder` override this to land in their own variants.
    fn into_command(self: Box<Self>) -> Command
    where
        Self: Sized + 'static,
    {
        Command::Op(self)
    }
}

impl<O: Operation + ?Sized> Operation for Box<O> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        (**self).execute()
    }
}

/// Operation built from a name and a closure.
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F> FnOperation<F>
where
    F: FnMut() -> Result<(), OperationError> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Operation for FnOperation<F>
where
    F: FnMut() -> Result<(), OperationError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        (self.f)()
    }
}

/// What the command queue holds: a closed set of variants.
///
/// Keeping retries and recorders as their own variants lets the queue
/// re-enqueue a transiently failing `RetryWrapper` as-is (its counter persists)
/// instead of wrapping it again.
pub enum Command {
    Op(Box<dyn Operation>),
    Retry(RetryWrapper),
    Record(FailureRecorder),
}

impl Command {
    /// Wrap an operation, routing retry wrappers and recorders to their own
    /// variants.
    pub fn op<O: Operation + 'static>(operation: O) -> Self {
        <O as Operation>::into_command(Box::new(operation))
    }

    /// Name of the held command (`Retry(inner)` for a wrapper).
    pub fn name(&self) -> &str {
        match self {
            Command::Op(op) => op.name(),
            Command::Retry(retry) => retry.name(),
            Command::Record(recorder) => recorder.name(),
        }
    }

    /// One dispatch of the held command.
    pub fn execute(&mut self) -> Result<(), OperationError> {
        match self {
            Command::Op(op) => op.execute(),
            Command::Retry(retry) => retry.execute(),
            Command::Record(recorder) => recorder.execute(),
        }
    }
}

impl From<Box<dyn Operation>> for Command {
    fn from(op: Box<dyn Operation>) -> Self {
        Command::Op(op)
    }
}

impl From<RetryWrapper> for Command {
    fn from(retry: RetryWrapper) -> Self {
        Command::Retry(retry)
    }
}

impl From<FailureRecorder> for Command {
    fn from(recorder: FailureRecorder) -> Self {
        Command::Record(recorder)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Command::Op(_) => "Op",
            Command::Retry(_) => "Retry",
            Command::Record(_) => "Record",
        };
        f.debug_struct("Command")
            .field("variant", &variant)
            .field("name", &self.name())
            .finish()
    }
}
