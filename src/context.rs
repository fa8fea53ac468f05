//! GPU context: surface, device, camera resources and the pipeline set.

use std::sync::Arc;

use anyhow::Context as _;
use cgmath::Deg;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::camera::{Camera, CameraUniform, Projection};
use crate::data_structures::texture::Texture;
use crate::pipelines::Pipelines;
use crate::settings::Settings;

/// The camera's GPU half: the uniform buffer and bind group the mesh
/// pipeline binds at group 1.
pub struct CameraResources {
    pub camera: Camera,
    pub projection: Projection,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl CameraResources {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, width: u32, height: u32) -> Self {
        let camera = Camera::new((0.0, 5.0, 10.0), Deg(-90.0), Deg(-20.0));
        let projection = Projection::new(width, height, Deg(45.0), 0.1, 500.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera buffer"),
            contents: bytemuck::bytes_of(&uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            camera,
            projection,
            uniform,
            buffer,
            bind_group,
        }
    }
}

pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub depth_texture: Texture,
    pub pipelines: Pipelines,
    pub settings: Settings,
    /// Whether the adapter granted `MULTI_DRAW_INDIRECT`. Batches fall back
    /// to per-submission draws when it is missing.
    pub multi_draw_supported: bool,
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: Settings) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        log::info!("adapter: {:?}", adapter.get_info().name);

        // optional features are requested only when the adapter has them
        let required_features = adapter.features() & wgpu::Features::MULTI_DRAW_INDIRECT;
        let multi_draw_supported = required_features.contains(wgpu::Features::MULTI_DRAW_INDIRECT);
        if !multi_draw_supported {
            log::warn!("MULTI_DRAW_INDIRECT not available on this adapter");
        }
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("device request failed")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = Pipelines::new(&device, config.format);
        let camera = CameraResources::new(
            &device,
            &pipelines.camera_layout,
            config.width,
            config.height,
        );
        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth texture");

        let mut settings = settings;
        settings.set_physical_window_size(config.width, config.height);
        settings.clear_aspect_ratio_changed();

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            camera,
            depth_texture,
            pipelines,
            settings,
            multi_draw_supported,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.settings.set_physical_window_size(width, height);
        if self.settings.minimised() {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth texture");
        self.camera.projection.resize(width, height);
        self.settings.clear_aspect_ratio_changed();
    }

    /// Refresh the camera uniform from the current camera and projection
    /// and queue the buffer write.
    pub fn write_camera_uniform(&mut self) {
        self.camera
            .uniform
            .update_view_proj(&self.camera.camera, &self.camera.projection);
        self.queue
            .write_buffer(&self.camera.buffer, 0, bytemuck::bytes_of(&self.camera.uniform));
    }
}
