//! Ship domain: vectors, movement, and commands that the queues run.
//!
//! These are collaborators of the engine, not part of it. They give the
//! command queue realistic operations, and their errors are classified
//! through `ShipError::into_operation_error`.

mod commands;
mod error;
mod movable;
mod spaceship;
mod vector;

pub use commands::{
    BurnFuelCommand, ChangeVelocityCommand, CheckFuelCommand, MOVE_WITH_FUEL, MoveCommand,
    RotateAndChangeVelocity, RotateCommand, move_with_fuel,
};
pub use error::ShipError;
pub use movable::{Movable, Rotatable, move_object, rotate};
pub use spaceship::{SharedShip, SpaceShip};
pub use vector::{Rotation, Vector};
