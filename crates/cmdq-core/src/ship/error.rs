use thiserror::Error;

use crate::domain::OperationError;

/// Failures raised by ship state and ship commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShipError {
    #[error("Not enough fuel to execute the command (required {required}, available {available})")]
    NotEnoughFuel { required: f64, available: f64 },

    #[error("cannot read position")]
    PositionUnreadable,

    #[error("cannot read velocity")]
    VelocityUnreadable,

    #[error("cannot set position")]
    PositionUnwritable,

    #[error("ship state is poisoned")]
    Poisoned,
}

impl ShipError {
    /// Attach the failing command's name and classify.
    ///
    /// A fuel shortage may clear up later (refuelling), so it is transient.
    /// Everything else is permanent.
    pub fn into_operation_error(self, operation: &str) -> OperationError {
        match self {
            ShipError::NotEnoughFuel { .. } => OperationError::transient(operation, self.to_string()),
            _ => OperationError::permanent(operation, self.to_string()),
        }
    }
}
