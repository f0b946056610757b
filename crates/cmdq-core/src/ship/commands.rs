//! Ship commands: operations acting on a `SharedShip`.
//!
//! # Failure classification
//!
//! | condition | kind |
//! |---|---|
//! | not enough fuel | transient (refuelling may fix it) |
//! | unreadable/unwritable position or velocity | permanent |
//! | poisoned ship lock | permanent |
//!
//! Each command locks the ship for the duration of one `execute`, so a
//! command never observes a half-applied change made by another.

use std::sync::{MutexGuard, PoisonError};

use super::error::ShipError;
use super::movable::{Movable, Rotatable, move_object, rotate};
use super::spaceship::{SharedShip, SpaceShip};
use super::vector::{Rotation, Vector};
use crate::command::{CompositeOperation, Operation};
use crate::domain::OperationError;

fn lock(ship: &SharedShip) -> Result<MutexGuard<'_, SpaceShip>, ShipError> {
    ship.lock().map_err(|_: PoisonError<_>| ShipError::Poisoned)
}

/// Run `f` against the locked ship, classifying any `ShipError` under `name`.
fn with_ship<T>(
    ship: &SharedShip,
    name: &str,
    f: impl FnOnce(&mut SpaceShip) -> Result<T, ShipError>,
) -> Result<T, OperationError> {
    lock(ship)
        .and_then(|mut guard| f(&mut guard))
        .map_err(|e| e.into_operation_error(name))
}

/// Fails transiently when the tank holds less than `required`.
pub struct CheckFuelCommand {
    ship: SharedShip,
    required: f64,
}

impl CheckFuelCommand {
    pub const NAME: &'static str = "CheckFuelCommand";

    pub fn new(ship: SharedShip, required: f64) -> Self {
        Self { ship, required }
    }
}

impl Operation for CheckFuelCommand {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        let required = self.required;
        with_ship(&self.ship, Self::NAME, |ship| {
            if ship.fuel() < required {
                return Err(ShipError::NotEnoughFuel {
                    required,
                    available: ship.fuel(),
                });
            }
            Ok(())
        })
    }
}

pub struct BurnFuelCommand {
    ship: SharedShip,
    amount: f64,
}

impl BurnFuelCommand {
    pub const NAME: &'static str = "BurnFuelCommand";

    pub fn new(ship: SharedShip, amount: f64) -> Self {
        Self { ship, amount }
    }
}

impl Operation for BurnFuelCommand {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        let amount = self.amount;
        with_ship(&self.ship, Self::NAME, |ship| ship.burn_fuel(amount))
    }
}

/// Applies the ship's velocity to its position once.
pub struct MoveCommand {
    ship: SharedShip,
}

impl MoveCommand {
    pub const NAME: &'static str = "MoveCommand";

    pub fn new(ship: SharedShip) -> Self {
        Self { ship }
    }
}

impl Operation for MoveCommand {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        with_ship(&self.ship, Self::NAME, |ship| move_object(ship))
    }
}

pub struct ChangeVelocityCommand {
    ship: SharedShip,
    velocity: Vector,
}

impl ChangeVelocityCommand {
    pub const NAME: &'static str = "ChangeVelocityCommand";

    pub fn new(ship: SharedShip, velocity: Vector) -> Self {
        Self { ship, velocity }
    }
}

impl Operation for ChangeVelocityCommand {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        let velocity = self.velocity;
        with_ship(&self.ship, Self::NAME, |ship| {
            ship.set_velocity(velocity);
            Ok(())
        })
    }
}

pub struct RotateCommand {
    ship: SharedShip,
    angle: Rotation,
}

impl RotateCommand {
    pub const NAME: &'static str = "RotateCommand";

    pub fn new(ship: SharedShip, angle: Rotation) -> Self {
        Self { ship, angle }
    }
}

impl Operation for RotateCommand {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        let angle = self.angle;
        with_ship(&self.ship, Self::NAME, |ship| {
            rotate(ship, angle);
            Ok(())
        })
    }
}

/// Turns the ship and, if it is moving, turns its velocity by the same angle.
pub struct RotateAndChangeVelocity {
    ship: SharedShip,
    angle: Rotation,
}

impl RotateAndChangeVelocity {
    pub const NAME: &'static str = "RotateAndChangeVelocity";

    pub fn new(ship: SharedShip, angle: Rotation) -> Self {
        Self { ship, angle }
    }
}

impl Operation for RotateAndChangeVelocity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn execute(&mut self) -> Result<(), OperationError> {
        let angle = self.angle;
        with_ship(&self.ship, Self::NAME, |ship| {
            ship.set_rotation(ship.rotation() + angle);
            let velocity = ship.velocity()?;
            if !velocity.is_zero() {
                ship.set_velocity(velocity.rotated(angle));
            }
            Ok(())
        })
    }
}

pub const MOVE_WITH_FUEL: &str = "MoveWithFuelCommand";

/// Check fuel, burn it, move. Halts at the first failing step.
pub fn move_with_fuel(ship: SharedShip, fuel: f64) -> CompositeOperation {
    let mut composite = CompositeOperation::new(MOVE_WITH_FUEL);
    composite
        .push(CheckFuelCommand::new(ship.clone(), fuel))
        .push(BurnFuelCommand::new(ship.clone(), fuel))
        .push(MoveCommand::new(ship));
    composite
}
