//! Failure record: the durable trace of a terminal failure.
//!
//! A record names the failure twice:
//!
//! - `operation`: where the failure originated (the inner command of a retry,
//!   the composite for a halted sequence).
//! - `dispatched_as`: the command the queue actually ran last, e.g.
//!   `Retry(CheckFuelCommand)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{FailureKind, OperationError};
use super::ids::RecordId;

/// Immutable record of a failure that was not (or no longer) retried.
///
/// Created once by a `FailureRecorder` and handed to a `FailureSink`.
/// Fields are private so a record cannot be edited after capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    id: RecordId,
    operation: String,
    dispatched_as: String,
    kind: FailureKind,
    message: String,
    attempts: u32,
    captured_at: DateTime<Utc>,
}

impl FailureRecord {
    pub fn new(
        id: RecordId,
        dispatched_as: impl Into<String>,
        error: &OperationError,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            operation: error.operation().to_string(),
            dispatched_as: dispatched_as.into(),
            kind: error.kind(),
            message: error.message().to_string(),
            attempts: error.attempts(),
            captured_at,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Name of the operation the failure originated in.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Name of the command whose dispatch produced the failure.
    pub fn dispatched_as(&self) -> &str {
        &self.dispatched_as
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ulid::Ulid;

    #[test]
    fn record_copies_error_context() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let err = OperationError::transient("CheckFuelCommand", "Not enough fuel").into_exhausted(2);
        let record = FailureRecord::new(
            RecordId::from_ulid(Ulid::new()),
            "Retry(CheckFuelCommand)",
            &err,
            at,
        );

        assert_eq!(record.operation(), "CheckFuelCommand");
        assert_eq!(record.dispatched_as(), "Retry(CheckFuelCommand)");
        assert_eq!(record.kind(), FailureKind::Exhausted);
        assert_eq!(record.message(), "Not enough fuel");
        assert_eq!(record.attempts(), 2);
        assert_eq!(record.captured_at(), at);
    }

    #[test]
    fn record_serializes_name_and_message() {
        let err = OperationError::permanent("MoveCommand", "cannot read position");
        let record = FailureRecord::new(RecordId::from_ulid(Ulid::new()), "MoveCommand", &err, Utc::now());
        let v = serde_json::to_value(&record).unwrap();
        assert_eq!(v["operation"], "MoveCommand");
        assert_eq!(v["dispatched_as"], "MoveCommand");
        assert_eq!(v["message"], "cannot read position");
        assert_eq!(v["kind"], "permanent");
    }
}
