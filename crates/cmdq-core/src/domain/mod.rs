//! Domain model: failure classification, identifiers and failure records.

pub mod errors;
pub mod ids;
pub mod record;

pub use self::errors::{FailureKind, OperationError};
pub use self::ids::RecordId;
pub use self::record::FailureRecord;
