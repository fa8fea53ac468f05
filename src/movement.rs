//! Bounded movement with wall bouncing.

use cgmath::{ElementWise, Point3, Vector3};

use crate::geometry::{Aabb, Compass};

/// Moves a bounding box inside an enclosing region, reflecting the
/// direction component that crossed a wall. Typically advanced from a fixed
/// step and queried for the accumulated translation when rendering.
#[derive(Debug, Clone)]
pub struct MoveController {
    direction: Vector3<f32>,
    initial_position: Point3<f32>,
    bounds: Aabb,
}

impl MoveController {
    pub fn new(bounds: Aabb, initial_position: Point3<f32>, direction: Vector3<f32>) -> Self {
        let mut bounds = bounds;
        bounds.move_to(initial_position);
        Self {
            direction,
            initial_position,
            bounds,
        }
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vector3<f32>) {
        self.direction = direction;
    }

    /// How far the controller has drifted from where it started. Feed this
    /// into a node's translate to move its geometry.
    pub fn translate_vector(&self) -> Vector3<f32> {
        self.bounds.center() - self.initial_position
    }

    /// Step along the current direction, component-wise scaled by `speed`.
    pub fn advance(&mut self, speed: Vector3<f32>) {
        self.bounds.translate(self.direction.mul_element_wise(speed));
    }

    /// Reflect the direction component for whichever wall of `scenery` the
    /// bounds have crossed, if any, and clamp the bounds back inside so the
    /// next check starts from a contained position. Returns the crossed
    /// wall.
    pub fn bounce_if_collided(&mut self, scenery: &Aabb) -> Compass {
        let wall = self.bounds.escape_direction(scenery);
        let correction = match wall {
            Compass::East => {
                self.direction.x = -self.direction.x;
                Vector3::new(scenery.max().x - self.bounds.max().x, 0.0, 0.0)
            }
            Compass::West => {
                self.direction.x = -self.direction.x;
                Vector3::new(scenery.min().x - self.bounds.min().x, 0.0, 0.0)
            }
            Compass::North => {
                self.direction.y = -self.direction.y;
                Vector3::new(0.0, scenery.max().y - self.bounds.max().y, 0.0)
            }
            Compass::South => {
                self.direction.y = -self.direction.y;
                Vector3::new(0.0, scenery.min().y - self.bounds.min().y, 0.0)
            }
            Compass::In => {
                self.direction.z = -self.direction.z;
                Vector3::new(0.0, 0.0, scenery.max().z - self.bounds.max().z)
            }
            Compass::Out => {
                self.direction.z = -self.direction.z;
                Vector3::new(0.0, 0.0, scenery.min().z - self.bounds.min().z)
            }
            Compass::NoDirection => return wall,
        };
        self.bounds.translate(correction);
        wall
    }
}
