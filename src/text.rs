//! Text rendering from a packed glyph atlas.
//!
//! Rasterisation is behind the [`GlyphRasterizer`] trait so the atlas
//! builder, packing and quad layout stay independent of any particular font
//! library. The atlas packs printable ASCII into shelf rows of a single
//! channel image; [`FontAtlas::create_text`] lays glyph quads out along a
//! pen position, six `vec4(x, y, u, v)` vertices per visible glyph.

use std::collections::HashMap;

use cgmath::{Point3, Vector2, Vector4};
use image::GrayImage;

use crate::context::Context;
use crate::data_structures::texture::Texture;
use crate::error::EngineError;
use crate::geometry::Aabb;
use crate::render::{FrameContext, FrameHook, SubmissionBinding};

/// Rows wrap once they reach this many pixels.
pub const MAX_ROW_WIDTH: u32 = 512;

/// One rasterised glyph: coverage bitmap plus pixel metrics. `bearing_y`
/// measures from the baseline up to the bitmap top, advances are in whole
/// pixels.
pub struct RasterGlyph {
    pub width: u32,
    pub height: u32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub advance_x: i32,
    pub advance_y: i32,
    /// Row-major coverage, `width * height` bytes.
    pub bitmap: Vec<u8>,
}

/// The narrow seam to a font library. Returning `None` marks the glyph as
/// unavailable; the atlas logs and carries on without it.
pub trait GlyphRasterizer {
    fn rasterize(&mut self, ch: char, pixel_height: u32) -> Option<RasterGlyph>;
}

/// Metrics of a packed glyph. Sizes and bearings are in pixels, offsets are
/// normalised atlas coordinates of the glyph's top left corner.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub advance_x: f32,
    pub advance_y: f32,
    pub width: f32,
    pub height: f32,
    pub bearing_x: f32,
    pub bearing_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

pub struct FontAtlas {
    image: GrayImage,
    glyphs: HashMap<char, Glyph>,
}

impl FontAtlas {
    /// Rasterise printable ASCII and pack it. Two passes: the first sizes
    /// the atlas, the second blits. Glyphs the rasteriser cannot produce
    /// are logged and skipped; an atlas with nothing in it is an error.
    pub fn build(
        rasterizer: &mut dyn GlyphRasterizer,
        pixel_height: u32,
    ) -> Result<Self, EngineError> {
        let mut rastered: Vec<(char, RasterGlyph)> = Vec::new();
        for code in 32u8..128 {
            let ch = code as char;
            match rasterizer.rasterize(ch, pixel_height) {
                Some(glyph) => rastered.push((ch, glyph)),
                None => log::warn!("glyph `{ch}` failed to rasterise, skipping"),
            }
        }
        if rastered.is_empty() {
            return Err(EngineError::EmptyAtlas);
        }

        // pass 1: measure
        let mut width = 0u32;
        let mut height = 0u32;
        let mut row_width = 0u32;
        let mut row_height = 0u32;
        for (_, g) in &rastered {
            if row_width + g.width + 1 >= MAX_ROW_WIDTH {
                width = width.max(row_width);
                height += row_height;
                row_width = 0;
                row_height = 0;
            }
            row_width += g.width + 1;
            row_height = row_height.max(g.height);
        }
        width = width.max(row_width);
        height += row_height;
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyAtlas);
        }

        // pass 2: blit
        let mut image = GrayImage::new(width, height);
        let mut glyphs = HashMap::new();
        let mut pen_x = 0u32;
        let mut pen_y = 0u32;
        row_height = 0;
        for (ch, g) in &rastered {
            if pen_x + g.width + 1 >= MAX_ROW_WIDTH {
                pen_y += row_height;
                pen_x = 0;
                row_height = 0;
            }
            for y in 0..g.height {
                for x in 0..g.width {
                    let coverage = g.bitmap[(y * g.width + x) as usize];
                    image.put_pixel(pen_x + x, pen_y + y, image::Luma([coverage]));
                }
            }
            glyphs.insert(
                *ch,
                Glyph {
                    advance_x: g.advance_x as f32,
                    advance_y: g.advance_y as f32,
                    width: g.width as f32,
                    height: g.height as f32,
                    bearing_x: g.bearing_x as f32,
                    bearing_y: g.bearing_y as f32,
                    offset_x: pen_x as f32 / width as f32,
                    offset_y: pen_y as f32 / height as f32,
                },
            );
            pen_x += g.width + 1;
            row_height = row_height.max(g.height);
        }

        Ok(Self { image, glyphs })
    }

    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Lay the string out from the origin, advancing a pen per glyph.
    /// Returns six `(x, y, u, v)` vertices per visible glyph, two counter
    /// clockwise triangles each. Zero sized glyphs (spaces) advance the pen
    /// without emitting geometry; characters missing from the atlas are
    /// logged and skipped.
    pub fn create_text(&self, text: &str, sx: f32, sy: f32) -> Vec<Vector4<f32>> {
        let atlas_w = self.image.width() as f32;
        let atlas_h = self.image.height() as f32;
        let mut quads = Vec::new();
        let mut pen_x = 0.0f32;
        let mut pen_y = 0.0f32;
        for ch in text.chars() {
            let Some(g) = self.glyphs.get(&ch) else {
                log::warn!("character `{ch}` not in atlas, skipping");
                continue;
            };
            let left = pen_x + g.bearing_x * sx;
            let top = pen_y + g.bearing_y * sy;
            let w = g.width * sx;
            let h = g.height * sy;
            pen_x += g.advance_x * sx;
            pen_y += g.advance_y * sy;
            if g.width == 0.0 || g.height == 0.0 {
                continue;
            }
            let u1 = g.offset_x;
            let v1 = g.offset_y;
            let u2 = u1 + g.width / atlas_w;
            let v2 = v1 + g.height / atlas_h;
            quads.extend_from_slice(&[
                Vector4::new(left, top, u1, v1),
                Vector4::new(left, top - h, u1, v2),
                Vector4::new(left + w, top, u2, v1),
                Vector4::new(left + w, top, u2, v1),
                Vector4::new(left, top - h, u1, v2),
                Vector4::new(left + w, top - h, u2, v2),
            ]);
        }
        quads
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Bottom,
    Center,
    Top,
}

/// Where the layout origin should sit relative to the text's bounds.
/// `Left` means the text extends to the right of the origin, `Bottom` that
/// it extends upward.
#[derive(Debug, Clone, Copy)]
pub struct TextAnchor {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

/// Displace laid out quads so their bounds sit against the anchor, and
/// return the moved bounds. `None` for an empty quad list.
pub fn anchor_quads(quads: &mut [Vector4<f32>], anchor: TextAnchor) -> Option<Aabb> {
    let bounds = Aabb::enclosing(quads.iter().map(|q| Point3::new(q.x, q.y, 0.0)))?;
    let dx = match anchor.horizontal {
        HAlign::Left => -bounds.min().x,
        HAlign::Center => -bounds.center().x,
        HAlign::Right => -bounds.max().x,
    };
    let dy = match anchor.vertical {
        VAlign::Bottom => -bounds.min().y,
        VAlign::Center => -bounds.center().y,
        VAlign::Top => -bounds.max().y,
    };
    for q in quads.iter_mut() {
        q.x += dx;
        q.y += dy;
    }
    let mut moved = bounds;
    moved.translate(cgmath::Vector3::new(dx, dy, 0.0));
    Some(moved)
}

/// Everything needed to lay out one piece of text.
#[derive(Debug, Clone)]
pub struct TextData {
    pub text: String,
    pub scale: Vector2<f32>,
    pub colour: [f32; 4],
    pub anchor: Option<TextAnchor>,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            scale: Vector2::new(1.0, 1.0),
            colour: [1.0, 1.0, 1.0, 1.0],
            anchor: None,
        }
    }

    pub fn scale(mut self, sx: f32, sy: f32) -> Self {
        self.scale = Vector2::new(sx, sy);
        self
    }

    pub fn colour(mut self, colour: [f32; 4]) -> Self {
        self.colour = colour;
        self
    }

    pub fn anchor(mut self, anchor: TextAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }
}

/// A sealed piece of text: quad buffer, uploaded atlas and uniform binding.
pub struct TextRenderer {
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    atlas_bind_group: wgpu::BindGroup,
    binding: SubmissionBinding,
    colour: [f32; 4],
    bounds: Option<Aabb>,
    hooks: Vec<Box<dyn FrameHook>>,
}

impl TextRenderer {
    pub fn new(ctx: &Context, atlas: &FontAtlas, data: &TextData) -> Result<Self, EngineError> {
        use wgpu::util::DeviceExt;

        if data.text.is_empty() {
            return Err(EngineError::EmptyText(data.text.clone()));
        }
        let mut quads = atlas.create_text(&data.text, data.scale.x, data.scale.y);
        if quads.is_empty() {
            return Err(EngineError::EmptyText(data.text.clone()));
        }
        let bounds = data.anchor.and_then(|anchor| anchor_quads(&mut quads, anchor));

        let texture = Texture::from_gray(&ctx.device, &ctx.queue, atlas.image(), Some("glyph atlas"));
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(&ctx.device));
        let atlas_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glyph atlas bind group"),
            layout: &ctx.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let flat: Vec<[f32; 4]> = quads.iter().map(|q| [q.x, q.y, q.z, q.w]).collect();
        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("text quads"),
                contents: bytemuck::cast_slice(&flat),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            vertex_buffer,
            vertex_count: quads.len() as u32,
            atlas_bind_group,
            binding: SubmissionBinding::new(&ctx.device, &ctx.pipelines.submission_layout),
            colour: data.colour,
            bounds,
            hooks: Vec::new(),
        })
    }

    /// Bounds of the laid out quads after anchoring, when an anchor was
    /// set.
    pub fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    pub fn add_hook(&mut self, hook: Box<dyn FrameHook>) {
        self.hooks.push(hook);
    }

    /// Queue this frame's uniform write. Call before the pass is submitted.
    pub fn write(&self, queue: &wgpu::Queue, frame: &FrameContext) {
        self.binding.write(queue, frame, self.colour, &self.hooks);
    }

    /// Record the draw. The text pipeline must already be set on the pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.binding.bind_group, &[]);
        pass.set_bind_group(1, &self.atlas_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
