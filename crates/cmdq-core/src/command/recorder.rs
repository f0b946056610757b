//! Failure recorder: turns a captured failure into a `FailureRecord`.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{Command, Operation};
use crate::domain::{FailureRecord, OperationError};
use crate::ports::{FailureSink, IdGenerator};

/// Terminal command for a failure that will not be retried.
///
/// `execute` hands one `FailureRecord` to the sink and always returns `Ok`.
/// Executing it again records nothing further.
pub struct FailureRecorder {
    dispatched_as: String,
    error: OperationError,
    captured_at: DateTime<Utc>,
    sink: Arc<dyn FailureSink>,
    ids: Arc<dyn IdGenerator>,
    recorded: bool,
}

impl FailureRecorder {
    pub fn new(
        dispatched_as: impl Into<String>,
        error: OperationError,
        captured_at: DateTime<Utc>,
        sink: Arc<dyn FailureSink>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            dispatched_as: dispatched_as.into(),
            error,
            captured_at,
            sink,
            ids,
            recorded: false,
        }
    }

    /// Name of the command as it was dispatched (the wrapper name, if wrapped).
    pub fn dispatched_as(&self) -> &str {
        &self.dispatched_as
    }

    pub fn error(&self) -> &OperationError {
        &self.error
    }
}

impl Operation for FailureRecorder {
    fn name(&self) -> &str {
        "FailureRecorder"
    }

    fn into_command(self: Box<Self>) -> Command {
        Command::Record(*self)
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        if self.recorded {
            return Ok(());
        }
        let record = FailureRecord::new(
            self.ids.generate_record_id(),
            &self.dispatched_as,
            &self.error,
            self.captured_at,
        );
        self.sink.record(record);
        self.recorded = true;
        Ok(())
    }
}
