//! View frustum culling against axis-aligned boxes.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use super::Aabb;

/// A plane in normal/distance form. Points with a positive signed distance
/// lie on the side the normal points to.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    normal: Vector3<f32>,
    distance: f32,
}

impl Plane {
    pub fn new(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: normal.dot(point.to_vec()),
        }
    }

    pub fn signed_distance(&self, p: Point3<f32>) -> f32 {
        self.normal.dot(p.to_vec()) - self.distance
    }

    /// True when any part of the box is on or in front of the plane.
    ///
    /// Projects the box extents onto the plane normal and compares the
    /// center distance against the projected radius.
    pub fn is_on_or_forward(&self, bounds: &Aabb) -> bool {
        let e = bounds.extents();
        let r = e.x * self.normal.x.abs() + e.y * self.normal.y.abs() + e.z * self.normal.z.abs();
        self.signed_distance(bounds.center()) >= -r
    }
}

/// Six planes with normals pointing into the view volume. A box is visible
/// only if every plane agrees.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub near: Plane,
    pub far: Plane,
    pub left: Plane,
    pub right: Plane,
    pub top: Plane,
    pub bottom: Plane,
}

impl Frustum {
    /// Build from a camera basis and perspective parameters. `front`,
    /// `right` and `up` must be orthonormal, `fovy` in radians.
    pub fn from_camera(
        position: Point3<f32>,
        front: Vector3<f32>,
        right: Vector3<f32>,
        up: Vector3<f32>,
        aspect: f32,
        fovy: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let half_v = zfar * (fovy * 0.5).tan();
        let half_h = half_v * aspect;
        let front_far = front * zfar;

        Self {
            near: Plane::new(position + front * znear, front),
            far: Plane::new(position + front_far, -front),
            right: Plane::new(position, (front_far - right * half_h).cross(up)),
            left: Plane::new(position, up.cross(front_far + right * half_h)),
            top: Plane::new(position, right.cross(front_far - up * half_v)),
            bottom: Plane::new(position, (front_far + up * half_v).cross(right)),
        }
    }

    pub fn intersects(&self, bounds: &Aabb) -> bool {
        self.near.is_on_or_forward(bounds)
            && self.far.is_on_or_forward(bounds)
            && self.left.is_on_or_forward(bounds)
            && self.right.is_on_or_forward(bounds)
            && self.top.is_on_or_forward(bounds)
            && self.bottom.is_on_or_forward(bounds)
    }
}
