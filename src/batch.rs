//! Batched flat-colour rendering.
//!
//! A [`BatchBuffer`] accumulates mesh submissions on the CPU, then seals
//! them into GPU buffers once with [`prepare`](BatchBuffer::prepare) and
//! replays them every frame with [`draw`](BatchBuffer::draw). How the
//! sealed data turns into draw calls is decided by the [`DrawStrategy`]
//! chosen at construction:
//!
//! * [`DrawArrays`] issues one draw per submission.
//! * [`DrawMulti`] packs all submissions into a single
//!   `multi_draw_indirect` call (needs `Features::MULTI_DRAW_INDIRECT`).
//! * [`PrimitiveRestart`] joins strip submissions with a restart sentinel
//!   and draws the combined index list once.
//!
//! Planning (offsets, counts, index streams) is plain arithmetic and can be
//! inspected without a device.

use std::ops::Range;

use cgmath::{Vector3, Vector4};
use wgpu::util::DeviceExt;

use crate::data_structures::mesh_data::{MeshData, RenderData};
use crate::error::EngineError;

/// Index value that cuts a strip when primitive restart is in effect.
/// Matches the implicit sentinel wgpu uses for `Uint32` strip indices.
pub const RESTART_INDEX: u32 = u32::MAX;

/// Per-submission start offsets and vertex counts, in submission order.
/// This is the layout `multi_draw_indirect` consumes.
pub fn multi_draw_plan(submissions: &[RenderData]) -> (Vec<u32>, Vec<u32>) {
    let mut starts = Vec::with_capacity(submissions.len());
    let mut counts = Vec::with_capacity(submissions.len());
    let mut running = 0u32;
    for rd in submissions {
        starts.push(running);
        counts.push(rd.vertices_count);
        running += rd.vertices_count;
    }
    (starts, counts)
}

/// Sealed GPU buffers of a batch.
pub struct GpuBatch {
    pub vertex: wgpu::Buffer,
    pub index: Option<wgpu::Buffer>,
    pub restart_index: Option<wgpu::Buffer>,
}

/// How a sealed batch is turned into draw calls.
///
/// `plan` runs during sealing over the recorded submissions and touches no
/// GPU state; `upload` creates whatever extra buffers the strategy needs;
/// `draw` replays the batch into a pass that already has its pipeline and
/// bind groups set.
pub trait DrawStrategy {
    fn uses_restart_index(&self) -> bool {
        false
    }
    fn plan(&mut self, submissions: &[RenderData], restart_index_count: u32);
    fn upload(&mut self, device: &wgpu::Device);
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, gpu: &GpuBatch, submissions: &[RenderData]);
}

/// One draw call per submission, offset by a running vertex sum. Indexed
/// submissions draw their recorded index range with the running sum as the
/// base vertex.
#[derive(Default)]
pub struct DrawArrays;

impl DrawStrategy for DrawArrays {
    fn plan(&mut self, _submissions: &[RenderData], _restart_index_count: u32) {}

    fn upload(&mut self, _device: &wgpu::Device) {}

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, gpu: &GpuBatch, submissions: &[RenderData]) {
        let mut first_vertex = 0u32;
        for rd in submissions {
            if rd.indices_count > 0 {
                if let Some(index) = &gpu.index {
                    pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(
                        rd.first_index..rd.first_index + rd.indices_count,
                        first_vertex as i32,
                        0..1,
                    );
                }
            } else {
                pass.draw(first_vertex..first_vertex + rd.vertices_count, 0..1);
            }
            first_vertex += rd.vertices_count;
        }
    }
}

/// All submissions in one `multi_draw_indirect`. Start offsets and counts
/// are precomputed during planning and uploaded as indirect arguments.
#[derive(Default)]
pub struct DrawMulti {
    starts: Vec<u32>,
    counts: Vec<u32>,
    indirect: Option<wgpu::Buffer>,
}

impl DrawMulti {
    pub fn start_indexes(&self) -> &[u32] {
        &self.starts
    }

    pub fn vertex_counts(&self) -> &[u32] {
        &self.counts
    }
}

impl DrawStrategy for DrawMulti {
    fn plan(&mut self, submissions: &[RenderData], _restart_index_count: u32) {
        let (starts, counts) = multi_draw_plan(submissions);
        self.starts = starts;
        self.counts = counts;
    }

    fn upload(&mut self, device: &wgpu::Device) {
        let args: Vec<u8> = self
            .starts
            .iter()
            .zip(&self.counts)
            .flat_map(|(&first_vertex, &vertex_count)| {
                wgpu::util::DrawIndirectArgs {
                    vertex_count,
                    instance_count: 1,
                    first_vertex,
                    first_instance: 0,
                }
                .as_bytes()
                .to_vec()
            })
            .collect();
        self.indirect = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("batch indirect args"),
            contents: &args,
            usage: wgpu::BufferUsages::INDIRECT,
        }));
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, _gpu: &GpuBatch, _submissions: &[RenderData]) {
        let Some(indirect) = &self.indirect else {
            log::warn!("multi draw batch drawn before upload, skipping");
            return;
        };
        pass.multi_draw_indirect(indirect, 0, self.counts.len() as u32);
    }
}

/// Strip submissions joined by [`RESTART_INDEX`] and drawn as one indexed
/// call. The pipeline must use a strip topology with `Uint32` strip
/// indices for the sentinel to take effect.
#[derive(Default)]
pub struct PrimitiveRestart {
    index_count: u32,
}

impl DrawStrategy for PrimitiveRestart {
    fn uses_restart_index(&self) -> bool {
        true
    }

    fn plan(&mut self, _submissions: &[RenderData], restart_index_count: u32) {
        self.index_count = restart_index_count;
    }

    fn upload(&mut self, _device: &wgpu::Device) {}

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, gpu: &GpuBatch, _submissions: &[RenderData]) {
        let Some(restart) = &gpu.restart_index else {
            log::warn!("restart batch has no index stream, skipping");
            return;
        };
        pass.set_index_buffer(restart.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

pub struct BatchBuffer {
    strategy: Box<dyn DrawStrategy>,
    v3: Vec<Vector3<f32>>,
    v4: Vec<Vector4<f32>>,
    indices: Vec<u32>,
    restart_indices: Vec<u32>,
    submissions: Vec<RenderData>,
    gpu: Option<GpuBatch>,
}

impl BatchBuffer {
    pub fn new(strategy: Box<dyn DrawStrategy>) -> Self {
        Self {
            strategy,
            v3: Vec::new(),
            v4: Vec::new(),
            indices: Vec::new(),
            restart_indices: Vec::new(),
            submissions: Vec::new(),
            gpu: None,
        }
    }

    pub fn draw_arrays() -> Self {
        Self::new(Box::new(DrawArrays))
    }

    pub fn draw_multi() -> Self {
        Self::new(Box::new(DrawMulti::default()))
    }

    pub fn primitive_restart() -> Self {
        Self::new(Box::new(PrimitiveRestart::default()))
    }

    pub fn is_empty(&self) -> bool {
        self.v3.is_empty() && self.v4.is_empty()
    }

    pub fn submissions(&self) -> &[RenderData] {
        &self.submissions
    }

    /// The combined restart index stream, sentinel included after every
    /// submission. Empty unless the strategy asked for restart indices.
    pub fn restart_indices(&self) -> &[u32] {
        &self.restart_indices
    }

    /// Vertex ranges the [`DrawArrays`] strategy would draw, in submission
    /// order.
    pub fn draw_ranges(&self) -> Vec<Range<u32>> {
        let mut ranges = Vec::with_capacity(self.submissions.len());
        let mut first = 0u32;
        for rd in &self.submissions {
            ranges.push(first..first + rd.vertices_count);
            first += rd.vertices_count;
        }
        ranges
    }

    /// Record one submission. The mesh must carry exactly one of the two
    /// position streams, and nothing may be added once the batch is sealed.
    pub fn add(&mut self, mesh: &MeshData) -> Result<(), EngineError> {
        if self.gpu.is_some() {
            return Err(EngineError::BatchSealed);
        }
        if mesh.v3.is_empty() && mesh.v4.is_empty() {
            return Err(EngineError::MeshHasNoData);
        }
        if !mesh.v3.is_empty() && !mesh.v4.is_empty() {
            return Err(EngineError::MeshHasBothKinds);
        }

        let begin = (self.v3.len() + self.v4.len()) as u32;
        let count = (mesh.v3.len() + mesh.v4.len()) as u32;
        self.v3.extend_from_slice(&mesh.v3);
        self.v4.extend_from_slice(&mesh.v4);

        let mut rd = mesh.render_data;
        rd.vertices_count = count;

        if self.strategy.uses_restart_index() {
            self.restart_indices.extend(begin..begin + count);
            self.restart_indices.push(RESTART_INDEX);
        }

        if !mesh.indices.is_empty() {
            rd.first_index = self.indices.len() as u32;
            rd.indices_count = mesh.indices.len() as u32;
            // indices stay local to the submission; the running vertex sum
            // becomes the base vertex at draw time
            self.indices.extend_from_slice(&mesh.indices);
        }

        self.submissions.push(rd);
        Ok(())
    }

    /// Validate recorded submissions and run the strategy's planning step.
    /// Pure; sealing calls this before touching the device.
    pub fn plan(&mut self) -> Result<(), EngineError> {
        if !self.v3.is_empty() && !self.v4.is_empty() {
            return Err(EngineError::MixedVertexKinds);
        }
        self.strategy
            .plan(&self.submissions, self.restart_indices.len() as u32);
        Ok(())
    }

    /// Seal the batch into GPU buffers. One-time; an empty batch seals to
    /// nothing and later draws are skipped.
    pub fn prepare(&mut self, device: &wgpu::Device) -> Result<(), EngineError> {
        if self.gpu.is_some() {
            return Err(EngineError::BatchSealed);
        }
        self.plan()?;
        if self.is_empty() {
            log::warn!("prepare on an empty batch, nothing to seal");
            return Ok(());
        }

        let contents: Vec<u8> = if !self.v3.is_empty() {
            let flat: Vec<[f32; 3]> = self.v3.iter().map(|v| [v.x, v.y, v.z]).collect();
            bytemuck::cast_slice(&flat).to_vec()
        } else {
            let flat: Vec<[f32; 4]> = self.v4.iter().map(|v| [v.x, v.y, v.z, v.w]).collect();
            bytemuck::cast_slice(&flat).to_vec()
        };
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("batch vertices"),
            contents: &contents,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = (!self.indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("batch indices"),
                contents: bytemuck::cast_slice(&self.indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        let restart_index = (!self.restart_indices.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("batch restart indices"),
                contents: bytemuck::cast_slice(&self.restart_indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        self.strategy.upload(device);

        self.gpu = Some(GpuBatch {
            vertex,
            index,
            restart_index,
        });
        Ok(())
    }

    /// Replay the sealed batch into a pass that already has its pipeline
    /// and bind groups set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(gpu) = &self.gpu else {
            if !self.is_empty() {
                log::warn!("batch drawn before prepare, skipping");
            }
            return;
        };
        pass.set_vertex_buffer(0, gpu.vertex.slice(..));
        self.strategy.draw(pass, gpu, &self.submissions);
    }
}
