//! cmdq-core
//!
//! Fault-tolerant command execution.
//!
//! # Modules
//! - **command**: `Operation`, `CompositeOperation`, `RetryWrapper`, `FailureRecorder`,
//!   and the draining `CommandQueue` that classifies failures and re-dispatches them
//! - **worker**: `ConcurrentTaskQueue`, a single-worker FIFO with soft/hard stop
//! - **domain**: `FailureKind`, `OperationError`, `FailureRecord`, record IDs
//! - **ports**: `Clock`, `IdGenerator`, `FailureSink` and their implementations
//! - **config**: `EngineConfig`
//! - **observability**: tracing setup and drain/worker reports
//! - **ship**: spaceship domain used as a source of real operations

pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod ports;
pub mod ship;
pub mod worker;

pub use command::{
    Command, CommandQueue, CompositeOperation, FailureRecorder, FnOperation, Operation,
    RetryWrapper,
};
pub use config::EngineConfig;
pub use domain::{FailureKind, FailureRecord, OperationError};
pub use error::CmdqError;
pub use observability::{DrainReport, StopReason, WorkerReport};
pub use worker::ConcurrentTaskQueue;
