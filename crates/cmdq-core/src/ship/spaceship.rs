//! The ship itself: position, velocity, heading and fuel.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::error::ShipError;
use super::movable::{Movable, Rotatable};
use super::vector::{Rotation, Vector};

/// Ship shared between the commands that act on it.
pub type SharedShip = Arc<Mutex<SpaceShip>>;

/// A ship that can move, rotate and burn fuel.
///
/// Fuel never goes negative: `burn_fuel` refuses an overdraw instead of
/// clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceShip {
    position: Vector,
    velocity: Vector,
    rotation: Rotation,
    fuel: f64,
}

impl SpaceShip {
    /// New ship at rest.
    pub fn new(position: Vector, rotation: Rotation, fuel: f64) -> Self {
        Self {
            position,
            velocity: Vector::ZERO,
            rotation,
            fuel,
        }
    }

    pub fn shared(self) -> SharedShip {
        Arc::new(Mutex::new(self))
    }

    pub fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = velocity;
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    /// Fails without touching the tank when `amount` exceeds what is left.
    pub fn burn_fuel(&mut self, amount: f64) -> Result<(), ShipError> {
        if amount > self.fuel {
            return Err(ShipError::NotEnoughFuel {
                required: amount,
                available: self.fuel,
            });
        }
        self.fuel -= amount;
        Ok(())
    }
}

impl Movable for SpaceShip {
    fn position(&self) -> Result<Vector, ShipError> {
        Ok(self.position)
    }

    fn velocity(&self) -> Result<Vector, ShipError> {
        Ok(self.velocity)
    }

    fn set_position(&mut self, position: Vector) -> Result<(), ShipError> {
        self.position = position;
        Ok(())
    }
}

impl Rotatable for SpaceShip {
    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }
}
