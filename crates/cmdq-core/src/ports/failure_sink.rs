//! FailureSink port - where failure records end up.
//!
//! Recording is best-effort and infallible: `record` returns nothing, so a sink
//! can never make the drain loop fail.

use std::sync::{Mutex, PoisonError};

use crate::domain::FailureRecord;

/// FailureSink receives every terminal failure record.
pub trait FailureSink: Send + Sync {
    fn record(&self, record: FailureRecord);
}

/// Sink that only emits a log line per record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn record(&self, record: FailureRecord) {
        log_record(&record);
    }
}

/// Sink that keeps records in memory (and logs them).
#[derive(Debug, Default)]
pub struct InMemoryFailureSink {
    records: Mutex<Vec<FailureRecord>>,
}

impl InMemoryFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in recording order.
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FailureSink for InMemoryFailureSink {
    fn record(&self, record: FailureRecord) {
        log_record(&record);
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

fn log_record(record: &FailureRecord) {
    tracing::error!(
        record_id = %record.id(),
        operation = record.operation(),
        dispatched_as = record.dispatched_as(),
        kind = %record.kind(),
        attempts = record.attempts(),
        message = record.message(),
        "failure recorded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OperationError, RecordId};
    use chrono::Utc;
    use ulid::Ulid;

    fn record(name: &str) -> FailureRecord {
        let err = OperationError::permanent(name, "boom");
        FailureRecord::new(RecordId::from_ulid(Ulid::new()), name, &err, Utc::now())
    }

    #[test]
    fn in_memory_sink_keeps_order() {
        let sink = InMemoryFailureSink::new();
        assert!(sink.is_empty());

        sink.record(record("first"));
        sink.record(record("second"));

        let names: Vec<_> = sink
            .records()
            .iter()
            .map(|r| r.operation().to_string())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn tracing_sink_accepts_records() {
        TracingFailureSink.record(record("anything"));
    }
}
