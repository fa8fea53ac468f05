use reel_ngin::text::{
    FontAtlas, GlyphRasterizer, HAlign, MAX_ROW_WIDTH, RasterGlyph, TextAnchor, VAlign,
    anchor_quads,
};

/// Every printable character becomes a solid block of the same size;
/// spaces stay zero sized but keep their advance. Characters in `failing`
/// pretend the font lacks them.
struct BlockRasterizer {
    width: u32,
    height: u32,
    failing: Vec<char>,
}

impl BlockRasterizer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            failing: Vec::new(),
        }
    }
}

impl GlyphRasterizer for BlockRasterizer {
    fn rasterize(&mut self, ch: char, _pixel_height: u32) -> Option<RasterGlyph> {
        if self.failing.contains(&ch) {
            return None;
        }
        let (width, height) = if ch == ' ' {
            (0, 0)
        } else {
            (self.width, self.height)
        };
        Some(RasterGlyph {
            width,
            height,
            bearing_x: 0,
            bearing_y: height as i32,
            advance_x: self.width as i32 + 1,
            advance_y: 0,
            bitmap: vec![0xff; (width * height) as usize],
        })
    }
}

#[test]
fn should_pack_all_printable_ascii() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    // 96 printable characters, space included
    assert_eq!(atlas.glyph_count(), 96);
    assert!(atlas.glyph('A').is_some());
    assert!(atlas.glyph(' ').is_some());
}

#[test]
fn should_wrap_rows_at_the_width_limit() {
    let mut rasterizer = BlockRasterizer::new(40, 16);
    let atlas = FontAtlas::build(&mut rasterizer, 16).expect("atlas");
    // 95 solid 40px glyphs cannot fit one row
    assert!(atlas.image().width() as u32 <= MAX_ROW_WIDTH);
    assert!(atlas.image().height() > 16);
}

#[test]
fn should_skip_glyphs_the_rasterizer_cannot_produce() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    rasterizer.failing = vec!['@', '#'];
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    assert_eq!(atlas.glyph_count(), 94);
    assert!(atlas.glyph('@').is_none());
}

#[test]
fn should_emit_six_vertices_per_visible_glyph() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    // the space advances the pen but draws nothing
    let quads = atlas.create_text("ab c", 1.0, 1.0);
    assert_eq!(quads.len(), 3 * 6);
}

#[test]
fn should_advance_the_pen_between_glyphs() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    let quads = atlas.create_text("aa", 1.0, 1.0);
    // first vertex of each glyph is its left edge; advance is width + 1
    assert!((quads[0].x - 0.0).abs() < 1e-6);
    assert!((quads[6].x - 9.0).abs() < 1e-6);
}

#[test]
fn should_scale_layout_independently_per_axis() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    let quads = atlas.create_text("a", 2.0, 0.5);
    let width = quads.iter().map(|q| q.x).fold(f32::MIN, f32::max)
        - quads.iter().map(|q| q.x).fold(f32::MAX, f32::min);
    let height = quads.iter().map(|q| q.y).fold(f32::MIN, f32::max)
        - quads.iter().map(|q| q.y).fold(f32::MAX, f32::min);
    assert!((width - 16.0).abs() < 1e-5);
    assert!((height - 6.0).abs() < 1e-5);
}

#[test]
fn should_keep_uv_coordinates_inside_the_atlas() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    let quads = atlas.create_text("Hello!", 1.0, 1.0);
    for q in &quads {
        assert!((0.0..=1.0).contains(&q.z), "u out of range: {}", q.z);
        assert!((0.0..=1.0).contains(&q.w), "v out of range: {}", q.w);
    }
}

#[test]
fn should_anchor_quads_against_the_origin() {
    let mut rasterizer = BlockRasterizer::new(8, 12);
    let atlas = FontAtlas::build(&mut rasterizer, 12).expect("atlas");
    let mut quads = atlas.create_text("abc", 1.0, 1.0);

    let bounds = anchor_quads(
        &mut quads,
        TextAnchor {
            horizontal: HAlign::Right,
            vertical: VAlign::Top,
        },
    )
    .expect("bounds");

    // text now extends left of and below the origin
    assert!(bounds.max().x.abs() < 1e-5);
    assert!(bounds.max().y.abs() < 1e-5);
    assert!(bounds.min().x < 0.0);
    assert!(bounds.min().y < 0.0);
    let max_x = quads.iter().map(|q| q.x).fold(f32::MIN, f32::max);
    assert!(max_x.abs() < 1e-5);
}

#[test]
fn should_return_no_bounds_for_empty_quads() {
    let mut quads = Vec::new();
    assert!(
        anchor_quads(
            &mut quads,
            TextAnchor {
                horizontal: HAlign::Left,
                vertical: VAlign::Bottom,
            },
        )
        .is_none()
    );
}
