//! A model plus the buffer of instances it is drawn with.

use wgpu::util::DeviceExt;

use super::instance::Instance;
use super::model::{DrawModel, Model};

pub struct InstancedModel {
    pub model: Model,
    pub instances: Vec<Instance>,
    instance_buffer: wgpu::Buffer,
}

impl InstancedModel {
    pub fn new(device: &wgpu::Device, model: Model, instances: Vec<Instance>) -> Self {
        let raw = instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("instance buffer"),
            contents: bytemuck::cast_slice(&raw),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            model,
            instances,
            instance_buffer,
        }
    }

    /// Re-upload instance transforms after mutating `instances`. The buffer
    /// is sized at construction, so the count must not grow.
    pub fn update(&mut self, queue: &wgpu::Queue) {
        let raw = self.instances.iter().map(Instance::to_raw).collect::<Vec<_>>();
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, camera_bind_group: &wgpu::BindGroup) {
        if self.instances.is_empty() {
            log::warn!("instanced model drawn with zero instances, skipping");
            return;
        }
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw_model_instanced(&self.model, 0..self.instances.len() as u32, camera_bind_group);
    }
}
