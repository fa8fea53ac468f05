//! Point cloud particles with shared colours.
//!
//! Positions come as vec3 or vec4, never both. Colours are a shorter list
//! shared across consecutive particles; the divisor says how many particles
//! take each colour and defaults so the list stretches over the whole
//! cloud.

use cgmath::{Vector3, Vector4};
use wgpu::util::DeviceExt;

use crate::error::EngineError;
use crate::render::{FrameContext, FrameHook, SubmissionBinding};

#[derive(Debug, Clone, Default)]
pub struct Particles {
    v3: Vec<Vector3<f32>>,
    v4: Vec<Vector4<f32>>,
    colours: Vec<Vector4<f32>>,
    divisor: u32,
}

impl Particles {
    pub fn with_v3(positions: Vec<Vector3<f32>>) -> Self {
        Self {
            v3: positions,
            divisor: 1,
            ..Default::default()
        }
    }

    pub fn with_v4(positions: Vec<Vector4<f32>>) -> Self {
        Self {
            v4: positions,
            divisor: 1,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.v3.len() + self.v4.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assign the shared colour list. With no explicit divisor the list is
    /// stretched over the cloud: `ceil(particles / colours)` particles per
    /// colour. Positions must already be set so the default is computable.
    pub fn set_colours(
        &mut self,
        colours: Vec<Vector4<f32>>,
        divisor: Option<u32>,
    ) -> Result<(), EngineError> {
        if self.is_empty() {
            return Err(EngineError::ColoursBeforePositions);
        }
        self.divisor = match divisor {
            Some(d) => d.max(1),
            None => {
                let count = self.len() as u32;
                let colours_count = colours.len().max(1) as u32;
                count.div_ceil(colours_count).max(1)
            }
        };
        self.colours = colours;
        Ok(())
    }

    pub fn colour_divisor(&self) -> u32 {
        self.divisor
    }

    /// Colour of the particle at `index`: every `divisor` consecutive
    /// particles share one entry, the last entry covers any overflow.
    pub fn colour_for(&self, index: usize) -> Vector4<f32> {
        if self.colours.is_empty() {
            return Vector4::new(1.0, 1.0, 1.0, 1.0);
        }
        let slot = (index / self.divisor as usize).min(self.colours.len() - 1);
        self.colours[slot]
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ParticleVertex {
    position: [f32; 4],
    colour: [f32; 4],
}

/// Particles sealed into a point list vertex buffer. Colour assignment is
/// baked per vertex at seal time.
pub struct ParticlesRenderer {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    binding: SubmissionBinding,
    hooks: Vec<Box<dyn FrameHook>>,
}

impl ParticlesRenderer {
    pub fn new(
        device: &wgpu::Device,
        submission_layout: &wgpu::BindGroupLayout,
        particles: &Particles,
    ) -> Self {
        let vertices: Vec<ParticleVertex> = if !particles.v3.is_empty() {
            particles
                .v3
                .iter()
                .enumerate()
                .map(|(i, p)| ParticleVertex {
                    position: [p.x, p.y, p.z, 1.0],
                    colour: particles.colour_for(i).into(),
                })
                .collect()
        } else {
            particles
                .v4
                .iter()
                .enumerate()
                .map(|(i, p)| ParticleVertex {
                    position: [p.x, p.y, p.z, p.w],
                    colour: particles.colour_for(i).into(),
                })
                .collect()
        };
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("particle vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            binding: SubmissionBinding::new(device, submission_layout),
            hooks: Vec::new(),
        }
    }

    pub fn add_hook(&mut self, hook: Box<dyn FrameHook>) {
        self.hooks.push(hook);
    }

    /// Queue this frame's uniform write. Call before the pass is submitted.
    pub fn write(&self, queue: &wgpu::Queue, frame: &FrameContext) {
        self.binding
            .write(queue, frame, [1.0, 1.0, 1.0, 1.0], &self.hooks);
    }

    /// Record the draw. The particle pipeline must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            log::warn!("empty particle cloud drawn, skipping");
            return;
        }
        pass.set_bind_group(0, &self.binding.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

pub(crate) fn particle_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    use std::mem;
    wgpu::VertexBufferLayout {
        array_stride: mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            },
            wgpu::VertexAttribute {
                offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    }
}
