//! Per-frame rendering context and the uniform block flat renderers bind.

use cgmath::Matrix4;

/// Matrices and timing shared by every draw in a frame. `model` accumulates
/// as the scene graph walks down; renderers read the composed value.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub projection: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub model: Matrix4<f32>,
    /// Fraction of a fixed step the rendered state was interpolated by.
    pub alpha: f32,
    pub seconds_since_load: f32,
}

impl FrameContext {
    pub fn with_model(&self, model: Matrix4<f32>) -> Self {
        Self { model, ..*self }
    }

    /// Projection already carries the wgpu clip space correction, so the
    /// product is ready for the shader as-is.
    pub fn mvp(&self) -> Matrix4<f32> {
        self.projection * self.view * self.model
    }
}

/// Uniform block bound at group 0 by the flat, text and particle pipelines.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SubmissionUniform {
    pub mvp: [[f32; 4]; 4],
    pub colour: [f32; 4],
}

impl SubmissionUniform {
    pub fn new(frame: &FrameContext, colour: [f32; 4]) -> Self {
        Self {
            mvp: frame.mvp().into(),
            colour,
        }
    }
}

/// Last-moment adjustment of a submission's uniform before it is written.
///
/// Scenes attach hooks to a renderer to animate colour or transform per
/// frame without rebuilding vertex data. Hooks run in attachment order.
pub trait FrameHook {
    fn apply(&self, frame: &FrameContext, uniform: &mut SubmissionUniform);
}

/// Runs a closure every frame. Convenient for one-off tweaks that do not
/// warrant a named type.
pub struct HookFn<F>(pub F);

impl<F> FrameHook for HookFn<F>
where
    F: Fn(&FrameContext, &mut SubmissionUniform),
{
    fn apply(&self, frame: &FrameContext, uniform: &mut SubmissionUniform) {
        (self.0)(frame, uniform)
    }
}

/// A [`SubmissionUniform`] buffer with its bind group, bound at group 0 by
/// the flat, text and particle pipelines. Written once per frame per
/// renderer, before the pass is submitted.
pub struct SubmissionBinding {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl SubmissionBinding {
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        use wgpu::util::DeviceExt;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("submission uniform"),
            contents: bytemuck::bytes_of(&SubmissionUniform {
                mvp: cgmath::Matrix4::from_scale(1.0f32).into(),
                colour: [1.0, 1.0, 1.0, 1.0],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("submission bind group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    /// Compose the uniform for this frame, run the hooks over it and queue
    /// the write.
    pub fn write(
        &self,
        queue: &wgpu::Queue,
        frame: &FrameContext,
        colour: [f32; 4],
        hooks: &[Box<dyn FrameHook>],
    ) {
        let mut uniform = SubmissionUniform::new(frame, colour);
        for hook in hooks {
            hook.apply(frame, &mut uniform);
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&uniform));
    }
}
