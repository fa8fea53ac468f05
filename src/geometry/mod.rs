//! CPU-side geometry: bounding volumes, frustum culling and shape generators.
//!
//! Everything in here is plain math over [`cgmath`] types. No GPU resources
//! are touched, which keeps the whole module testable on machines without a
//! graphics adapter.

pub mod aabb;
pub mod frustum;
pub mod shapes;

pub use aabb::{Aabb, Compass};
pub use frustum::{Frustum, Plane};
