//! CPU-side mesh submissions for the batch renderer.

use cgmath::{EuclideanSpace, Point3, Vector3, Vector4};

use crate::error::EngineError;
use crate::geometry::Aabb;

/// Per-submission bookkeeping a batch keeps after the vertex data has been
/// consumed. Counts and offsets are in elements, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct RenderData {
    pub vertices_count: u32,
    pub indices_count: u32,
    pub first_index: u32,
    pub topology: wgpu::PrimitiveTopology,
    /// Flat colour applied to the whole submission, if any.
    pub colour: Option<[f32; 4]>,
}

impl Default for RenderData {
    fn default() -> Self {
        Self {
            vertices_count: 0,
            indices_count: 0,
            first_index: 0,
            topology: wgpu::PrimitiveTopology::TriangleList,
            colour: None,
        }
    }
}

/// One mesh worth of vertex data, either vec3 or vec4 positions but never
/// both. Indices are optional and local to this submission.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub v3: Vec<Vector3<f32>>,
    pub v4: Vec<Vector4<f32>>,
    pub indices: Vec<u32>,
    pub render_data: RenderData,
}

impl MeshData {
    pub fn with_v3(vertices: Vec<Vector3<f32>>, topology: wgpu::PrimitiveTopology) -> Self {
        Self {
            v3: vertices,
            render_data: RenderData {
                topology,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_v4(vertices: Vec<Vector4<f32>>, topology: wgpu::PrimitiveTopology) -> Self {
        Self {
            v4: vertices,
            render_data: RenderData {
                topology,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = indices;
        self
    }

    pub fn colour(mut self, colour: [f32; 4]) -> Self {
        self.render_data.colour = Some(colour);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.v3.is_empty() && self.v4.is_empty()
    }

    /// Bounds over whichever position stream is populated. For vec4 data
    /// only xyz contribute.
    pub fn bounds(&self) -> Result<Aabb, EngineError> {
        let points: Vec<Point3<f32>> = if !self.v3.is_empty() {
            self.v3.iter().map(|v| Point3::from_vec(*v)).collect()
        } else {
            self.v4
                .iter()
                .map(|v| Point3::new(v.x, v.y, v.z))
                .collect()
        };
        Aabb::enclosing(points).ok_or(EngineError::MeshDataUnset)
    }
}
