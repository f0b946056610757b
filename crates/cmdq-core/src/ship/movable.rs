use super::error::ShipError;
use super::vector::{Rotation, Vector};

/// Something with a position that moves by its velocity.
pub trait Movable {
    fn position(&self) -> Result<Vector, ShipError>;
    fn velocity(&self) -> Result<Vector, ShipError>;
    fn set_position(&mut self, position: Vector) -> Result<(), ShipError>;
}

/// Something with a heading.
pub trait Rotatable {
    fn rotation(&self) -> Rotation;
    fn set_rotation(&mut self, rotation: Rotation);
}

/// position += velocity. Nothing is written if a read fails.
pub fn move_object(movable: &mut dyn Movable) -> Result<(), ShipError> {
    let next = movable.position()? + movable.velocity()?;
    movable.set_position(next)
}

pub fn rotate(rotatable: &mut dyn Rotatable, angle: Rotation) {
    let heading = rotatable.rotation() + angle;
    rotatable.set_rotation(heading);
}
