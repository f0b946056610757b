//! Observability - tracing setup and run reports.
//!
//! # Logging
//! Everything in the crate logs through `tracing`. Binaries call
//! [`init_tracing`] once at startup; libraries embedding the engine can
//! install their own subscriber instead.
//!
//! # Reports
//! [`DrainReport`] and [`WorkerReport`] are plain counters returned by the
//! queues, serializable so a caller can print or ship them.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .try_init();

    if result.is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

/// Counters for one `CommandQueue::process_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    /// Commands popped and executed (including retries and recorders).
    pub executed: usize,
    pub succeeded: usize,
    pub retries_scheduled: usize,
    pub failures_recorded: usize,
}

/// Why the worker of a `ConcurrentTaskQueue` exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Soft,
    Hard,
}

/// Counters for one worker lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub executed: usize,
    /// Tasks that returned an error or panicked.
    pub failed: usize,
    /// Tasks dropped unexecuted by a hard stop.
    pub abandoned: usize,
    pub stop_reason: StopReason,
}
