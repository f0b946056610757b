//! Composite operation: ordered steps, halt at first failure.

use super::Operation;
use crate::domain::OperationError;

/// Runs its steps in insertion order.
///
/// The first failing step stops the sequence; later steps are not executed.
/// Effects of earlier steps stay in place (no rollback).
///
/// # Errors
/// The returned error is named after the composite, keeps the failing step's
/// `FailureKind` and carries the step's own error as its cause.
///
/// # Example
/// ```ignore
/// let mut fly = CompositeOperation::new("MoveWithFuelCommand");
/// fly.push(CheckFuelCommand::new(ship.clone(), 5.0))
///     .push(MoveCommand::new(ship.clone()))
///     .push(BurnFuelCommand::new(ship, 5.0));
/// queue.enqueue(fly);
/// ```
pub struct CompositeOperation {
    name: String,
    steps: Vec<Box<dyn Operation>>,
}

impl CompositeOperation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_steps(name: impl Into<String>, steps: Vec<Box<dyn Operation>>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }

    /// Append a step.
    pub fn push(&mut self, step: impl Operation + 'static) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Operation for CompositeOperation {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        let total = self.steps.len();
        for (index, step) in self.steps.iter_mut().enumerate() {
            if let Err(err) = step.execute() {
                let message = format!(
                    "execution stopped at step {}/{} ({}): {}",
                    index + 1,
                    total,
                    step.name(),
                    err.message()
                );
                let aggregate = OperationError::new(err.kind(), self.name.as_str(), message);
                return Err(aggregate.caused_by(err));
            }
        }
        Ok(())
    }
}
