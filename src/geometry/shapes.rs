//! Procedural point and outline generators for quick visualisation meshes.

use std::f32::consts::PI;

use cgmath::{Vector2, Vector3};

/// Closed circle outline in the xy plane, centered at the origin. The first
/// point is repeated at the end so the result draws as a line strip.
pub fn circle(segments: u32, radius: f32) -> Vec<Vector3<f32>> {
    let mut points = Vec::with_capacity(segments as usize + 1);
    for i in 0..=segments {
        let theta = 2.0 * PI * i as f32 / segments as f32;
        points.push(Vector3::new(radius * theta.cos(), radius * theta.sin(), 0.0));
    }
    points
}

/// Rectangle as a four point triangle strip: bottom left, bottom right,
/// top left, top right.
pub fn rectangle(size: Vector2<f32>, bottom_left: Vector2<f32>) -> Vec<Vector3<f32>> {
    vec![
        Vector3::new(bottom_left.x, bottom_left.y, 0.0),
        Vector3::new(bottom_left.x + size.x, bottom_left.y, 0.0),
        Vector3::new(bottom_left.x, bottom_left.y + size.y, 0.0),
        Vector3::new(bottom_left.x + size.x, bottom_left.y + size.y, 0.0),
    ]
}

/// Point cloud over a torus lying in the xz plane.
pub fn torus(
    major_segments: u32,
    minor_segments: u32,
    major_radius: f32,
    minor_radius: f32,
) -> Vec<Vector3<f32>> {
    let mut points = Vec::with_capacity((major_segments * minor_segments) as usize);
    for i in 0..major_segments {
        let u = 2.0 * PI * i as f32 / major_segments as f32;
        for j in 0..minor_segments {
            let v = 2.0 * PI * j as f32 / minor_segments as f32;
            let ring = major_radius + minor_radius * v.cos();
            points.push(Vector3::new(
                ring * u.cos(),
                minor_radius * v.sin(),
                ring * u.sin(),
            ));
        }
    }
    points
}

/// Evenly distributed points on a sphere using the golden angle spiral.
pub fn fibonacci_sphere(count: u32, radius: f32) -> Vec<Vector3<f32>> {
    let golden_angle = PI * (3.0 - 5.0f32.sqrt());
    let mut points = Vec::with_capacity(count as usize);
    for i in 0..count {
        // y runs from 1 to -1, each point on its own latitude
        let y = if count > 1 {
            1.0 - 2.0 * i as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let ring_radius = (1.0 - y * y).max(0.0).sqrt();
        let theta = golden_angle * i as f32;
        points.push(
            Vector3::new(theta.cos() * ring_radius, y, theta.sin() * ring_radius) * radius,
        );
    }
    points
}

/// Random looking but deterministic points inside a sphere, seeded by a
/// simple hash so repeated runs produce the same cloud.
pub fn points_in_sphere(count: u32, radius: f32) -> Vec<Vector3<f32>> {
    let mut points = Vec::with_capacity(count as usize);
    let mut state = 0x9e3779b9u32;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state as f32 / u32::MAX as f32
    };
    for _ in 0..count {
        let r = radius * next().cbrt();
        let theta = 2.0 * PI * next();
        let phi = (1.0 - 2.0 * next()).acos();
        points.push(Vector3::new(
            r * phi.sin() * theta.cos(),
            r * phi.cos(),
            r * phi.sin() * theta.sin(),
        ));
    }
    points
}
