use thiserror::Error;

/// Engine-level errors: configuration and worker lifecycle.
///
/// Operation failures never surface here; they are `OperationError`s handled
/// inside the queues.
#[derive(Debug, Error)]
pub enum CmdqError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("worker already started")]
    WorkerAlreadyStarted,

    #[error("task queue is closed (stop already requested)")]
    QueueClosed,

    #[error("worker not running (never started or already joined)")]
    WorkerNotRunning,

    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(String),

    #[error("worker thread panicked")]
    WorkerPanicked,

    #[error("async join failed: {0}")]
    Join(String),
}
