//! Bind group layouts and the fixed set of render pipelines.
//!
//! Every pipeline is built once at context creation against the surface
//! format. Topology is pipeline state in wgpu, so the flat family exists in
//! one variant per topology a batch may use; scenes pick the variant that
//! matches their batch before handing it the pass.

pub mod basic;

use basic::mk_render_pipeline;

use crate::data_structures::instance::InstanceRaw;
use crate::data_structures::model::{ModelVertex, Vertex};
use crate::data_structures::texture::Texture;
use crate::particles::particle_vertex_layout;

/// Camera uniform at binding 0, bound at group 1 by the mesh pipeline.
pub fn camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

/// A sampled 2d texture plus its sampler, the shape of every texture bind
/// group here (material diffuse, glyph atlas).
pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("texture layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

/// The per-submission uniform at binding 0, group 0 of the flat, text and
/// particle pipelines.
pub fn submission_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("submission layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

pub struct Pipelines {
    pub mesh: wgpu::RenderPipeline,
    pub flat_triangles: wgpu::RenderPipeline,
    pub flat_lines: wgpu::RenderPipeline,
    /// Line strips with `Uint32` strip indices, the restart sentinel cuts.
    pub flat_line_strip: wgpu::RenderPipeline,
    pub flat_points: wgpu::RenderPipeline,
    /// Flat triangles over vec4 positions.
    pub flat_v4: wgpu::RenderPipeline,
    pub text: wgpu::RenderPipeline,
    pub particles: wgpu::RenderPipeline,
    pub camera_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub submission_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let camera_layout = camera_layout(device);
        let texture_layout = texture_layout(device);
        let submission_layout = submission_layout(device);

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh pipeline layout"),
            bind_group_layouts: &[&texture_layout, &camera_layout],
            push_constant_ranges: &[],
        });
        let mesh = mk_render_pipeline(
            device,
            "mesh pipeline",
            &mesh_layout,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &[ModelVertex::desc(), InstanceRaw::desc()],
            wgpu::include_wgsl!("mesh.wgsl"),
            "vs_main",
            triangles(),
        );

        let flat_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat pipeline layout"),
            bind_group_layouts: &[&submission_layout],
            push_constant_ranges: &[],
        });
        let flat_v3_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        };
        let flat_v4_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            }],
        };
        let flat_pipeline = |label: &str,
                             entry: &str,
                             layout: wgpu::VertexBufferLayout<'static>,
                             primitive: wgpu::PrimitiveState| {
            mk_render_pipeline(
                device,
                label,
                &flat_layout,
                color_format,
                Some(Texture::DEPTH_FORMAT),
                &[layout],
                wgpu::include_wgsl!("flat.wgsl"),
                entry,
                primitive,
            )
        };
        let flat_triangles = flat_pipeline(
            "flat triangles",
            "vs_v3",
            flat_v3_layout.clone(),
            triangles(),
        );
        let flat_lines = flat_pipeline(
            "flat lines",
            "vs_v3",
            flat_v3_layout.clone(),
            topology(wgpu::PrimitiveTopology::LineList),
        );
        let flat_line_strip = flat_pipeline(
            "flat line strip",
            "vs_v3",
            flat_v3_layout.clone(),
            strip(wgpu::PrimitiveTopology::LineStrip),
        );
        let flat_points = flat_pipeline(
            "flat points",
            "vs_v3",
            flat_v3_layout,
            topology(wgpu::PrimitiveTopology::PointList),
        );
        let flat_v4 = flat_pipeline("flat v4 triangles", "vs_v4", flat_v4_layout, triangles());

        let text_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("text pipeline layout"),
            bind_group_layouts: &[&submission_layout, &texture_layout],
            push_constant_ranges: &[],
        });
        let text = mk_render_pipeline(
            device,
            "text pipeline",
            &text_layout,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                }],
            }],
            wgpu::include_wgsl!("text.wgsl"),
            "vs_main",
            triangles(),
        );

        let particles_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particles pipeline layout"),
            bind_group_layouts: &[&submission_layout],
            push_constant_ranges: &[],
        });
        let particles = mk_render_pipeline(
            device,
            "particles pipeline",
            &particles_layout,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &[particle_vertex_layout()],
            wgpu::include_wgsl!("particles.wgsl"),
            "vs_main",
            topology(wgpu::PrimitiveTopology::PointList),
        );

        Self {
            mesh,
            flat_triangles,
            flat_lines,
            flat_line_strip,
            flat_points,
            flat_v4,
            text,
            particles,
            camera_layout,
            texture_layout,
            submission_layout,
        }
    }

    /// The flat (vec3) pipeline matching a batch's topology.
    pub fn flat_for_topology(&self, topology: wgpu::PrimitiveTopology) -> &wgpu::RenderPipeline {
        match topology {
            wgpu::PrimitiveTopology::LineList => &self.flat_lines,
            wgpu::PrimitiveTopology::LineStrip => &self.flat_line_strip,
            wgpu::PrimitiveTopology::PointList => &self.flat_points,
            _ => &self.flat_triangles,
        }
    }
}

fn triangles() -> wgpu::PrimitiveState {
    topology(wgpu::PrimitiveTopology::TriangleList)
}

fn topology(topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Strip topologies declare `Uint32` strip indices so the restart sentinel
/// (`0xffff_ffff`) cuts the strip between submissions.
fn strip(topology: wgpu::PrimitiveTopology) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology,
        strip_index_format: Some(wgpu::IndexFormat::Uint32),
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}
