//! Command queue: FIFO drain with failure classification.
//!
//! # Dispatch loop
//!
//! `process_all` pops the head, executes it once and, on failure, appends at
//! most one follow-up command at the tail:
//!
//! | failed command | failure kind | follow-up |
//! |---|---|---|
//! | plain operation | transient | new `RetryWrapper` (`default_retry_attempts`) |
//! | `RetryWrapper` | transient | the same wrapper, counter intact |
//! | any | exhausted / permanent | `FailureRecorder` |
//! | `FailureRecorder` | (cannot fail) | none |
//!
//! ## Termination
//!
//! Retries are bounded and recorders never fail, so every failure chain ends
//! in exactly one recorder and the drain always finishes with an empty queue.
//!
//! ## Ordering
//!
//! Strict FIFO. A retried command waits behind everything that was already
//! queued when it failed.

use std::collections::VecDeque;
use std::sync::Arc;

use super::{Command, FailureRecorder, Operation, RetryWrapper};
use crate::config::EngineConfig;
use crate::domain::{FailureKind, OperationError};
use crate::error::CmdqError;
use crate::observability::DrainReport;
use crate::ports::{Clock, FailureSink, IdGenerator, SystemClock, TracingFailureSink, UlidGenerator};

/// FIFO queue of commands, drained on the calling thread.
///
/// The queue takes `&mut self` for every mutation: one owner, one drainer.
/// Wrap it in a mutex if several threads must feed it.
pub struct CommandQueue {
    commands: VecDeque<Command>,
    config: EngineConfig,
    sink: Arc<dyn FailureSink>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl CommandQueue {
    /// Queue with default config that records failures into `sink`.
    pub fn new(sink: Arc<dyn FailureSink>) -> Self {
        Self {
            commands: VecDeque::new(),
            config: EngineConfig::default(),
            sink,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
        }
    }

    /// Start a builder for custom config, sink, clock or id generator.
    pub fn builder() -> CommandQueueBuilder {
        CommandQueueBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append an operation at the tail.
    ///
    /// A `RetryWrapper` or `FailureRecorder` passed here keeps its own variant
    /// (see [`Operation::into_command`]), so a wrapper's bound is honoured.
    pub fn enqueue(&mut self, operation: impl Operation + 'static) {
        self.push(Command::op(operation));
    }

    /// Append a retry wrapper as-is, keeping its own bound.
    pub fn enqueue_retry(&mut self, retry: RetryWrapper) {
        self.push(Command::Retry(retry));
    }

    /// Append an already built [`Command`].
    pub fn push(&mut self, command: impl Into<Command>) {
        self.commands.push_back(command.into());
    }

    /// Commands waiting to be dispatched.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drain until the queue is observed empty.
    ///
    /// Commands enqueued by the commands being drained (retries, recorders)
    /// are processed in the same call.
    pub fn process_all(&mut self) -> DrainReport {
        let mut report = DrainReport::default();

        while let Some(mut command) = self.commands.pop_front() {
            report.executed += 1;
            match command.execute() {
                Ok(()) => {
                    report.succeeded += 1;
                    tracing::trace!(operation = command.name(), "command succeeded");
                }
                Err(err) => {
                    tracing::warn!(
                        operation = command.name(),
                        kind = %err.kind(),
                        message = err.message(),
                        "command failed"
                    );
                    self.handle_failure(command, err, &mut report);
                }
            }
        }

        tracing::debug!(
            executed = report.executed,
            succeeded = report.succeeded,
            retries_scheduled = report.retries_scheduled,
            failures_recorded = report.failures_recorded,
            "queue drained"
        );
        report
    }

    fn handle_failure(&mut self, command: Command, err: OperationError, report: &mut DrainReport) {
        let follow_up = match (command, err.kind()) {
            (Command::Retry(retry), FailureKind::Transient) => {
                tracing::debug!(
                    operation = retry.inner_name(),
                    attempts = retry.attempts(),
                    max_attempts = retry.max_attempts(),
                    "re-dispatching retry"
                );
                report.retries_scheduled += 1;
                Command::Retry(retry)
            }
            (Command::Op(op), FailureKind::Transient) => {
                tracing::debug!(
                    operation = op.name(),
                    max_attempts = self.config.default_retry_attempts,
                    "scheduling retry"
                );
                report.retries_scheduled += 1;
                Command::Retry(RetryWrapper::new(op, self.config.default_retry_attempts))
            }
            (Command::Record(recorder), _) => {
                // FailureRecorder::execute is infallible.
                tracing::error!(
                    operation = recorder.error().operation(),
                    "failure recorder reported an error; dropping it"
                );
                return;
            }
            (failed, _) => {
                tracing::debug!(operation = failed.name(), "recording failure");
                report.failures_recorded += 1;
                Command::Record(FailureRecorder::new(
                    failed.name(),
                    err,
                    self.clock.now(),
                    Arc::clone(&self.sink),
                    Arc::clone(&self.ids),
                ))
            }
        };
        self.commands.push_back(follow_up);
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(Arc::new(TracingFailureSink))
    }
}

/// Builder for `CommandQueue`.
///
/// Every part has a default: `EngineConfig::default()`, a tracing-only sink,
/// the system clock and a ULID generator.
///
/// # Example
/// ```ignore
/// let sink = Arc::new(InMemoryFailureSink::new());
/// let mut queue = CommandQueue::builder()
///     .config(EngineConfig::from_json_file("cmdq.json")?)
///     .sink(sink.clone())
///     .build()?;
/// ```
///
/// # Fail-fast
/// `build` validates the config, so a zero retry bound is rejected before
/// any command runs.
pub struct CommandQueueBuilder {
    config: EngineConfig,
    sink: Arc<dyn FailureSink>,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl CommandQueueBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            sink: Arc::new(TracingFailureSink),
            clock: Arc::new(SystemClock),
            ids: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Defaults to a ULID generator on the system clock.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<CommandQueue, CmdqError> {
        self.config.validate()?;
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(SystemClock)));
        Ok(CommandQueue {
            commands: VecDeque::new(),
            config: self.config,
            sink: self.sink,
            clock: self.clock,
            ids,
        })
    }
}

impl Default for CommandQueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}
