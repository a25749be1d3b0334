//! Software raster surface
//!
//! An in-memory RGBA8 buffer implementing `Surface`. Used for offscreen
//! scratch canvases (nine-patch panels) whose contents are later copied to
//! the window through `snapshot`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::font::FontCache;
use crate::geometry::Rect;
use crate::image::ImagePixels;
use crate::paint::RenderColor;
use crate::text::TextStyle;
use crate::Surface;

#[derive(Debug, Clone, Copy)]
struct DrawState {
    dx: f32,
    dy: f32,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            alpha: 1.0,
        }
    }
}

/// In-memory RGBA canvas
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
    state: DrawState,
    saved: SmallVec<[DrawState; 8]>,
    font: Option<Rc<RefCell<FontCache>>>,
}

impl Raster {
    /// Create a transparent raster
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            state: DrawState::default(),
            saved: SmallVec::new(),
            font: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Attach the face used by `fill_text`
    pub fn set_font(&mut self, font: Option<Rc<RefCell<FontCache>>>) {
        self.font = font;
    }

    /// Resize and clear; the buffer is only reallocated when the size changes
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.data = vec![0; (width as usize) * (height as usize) * 4];
        }
        self.clear();
    }

    /// Reset every pixel to transparent and the transform to identity
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.state = DrawState::default();
        self.saved.clear();
    }

    /// RGBA at a pixel, if in range
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Copy the current contents out as an image
    pub fn snapshot(&self) -> ImagePixels {
        ImagePixels::snapshot(self.width, self.height, self.data.clone())
    }

    /// Blend one pixel over the buffer (source-over, straight alpha)
    fn blend(&mut self, x: i32, y: i32, color: RenderColor, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let src_a = (color.a as f32 / 255.0) * coverage * self.state.alpha;
        if src_a <= 0.0 {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let dst = &mut self.data[i..i + 4];
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let mix = |s: u8, d: u8| -> u8 {
            let s = s as f32 * src_a;
            let d = d as f32 * dst_a * (1.0 - src_a);
            ((s + d) / out_a).round().clamp(0.0, 255.0) as u8
        };
        dst[0] = mix(color.r, dst[0]);
        dst[1] = mix(color.g, dst[1]);
        dst[2] = mix(color.b, dst[2]);
        dst[3] = (out_a * 255.0).round() as u8;
    }

    /// Integer pixel span covered by a rectangle in the current frame
    fn pixel_bounds(&self, rect: Rect) -> (i32, i32, i32, i32) {
        let rect = rect.translate(self.state.dx, self.state.dy);
        let x0 = rect.x.round() as i32;
        let y0 = rect.y.round() as i32;
        let x1 = rect.right().round() as i32;
        let y1 = rect.bottom().round() as i32;
        (
            x0.max(0),
            y0.max(0),
            x1.min(self.width as i32),
            y1.min(self.height as i32),
        )
    }

    fn fill_plain(&mut self, rect: Rect, color: RenderColor) {
        let (x0, y0, x1, y1) = self.pixel_bounds(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color, 1.0);
            }
        }
    }
}

/// Whether a pixel center lies inside a rounded rectangle
fn inside_rounded(rect: &Rect, radius: f32, px: f32, py: f32) -> bool {
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let cx = px.clamp(rect.x + r, rect.right() - r);
    let cy = py.clamp(rect.y + r, rect.bottom() - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

impl Surface for Raster {
    fn save(&mut self) {
        self.saved.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.dx += dx;
        self.state.dy += dy;
    }

    fn multiply_alpha(&mut self, alpha: f32) {
        self.state.alpha *= alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, rect: Rect, color: RenderColor, radius: f32) {
        if radius <= 0.0 {
            self.fill_plain(rect, color);
            return;
        }
        let placed = rect.translate(self.state.dx, self.state.dy);
        let (x0, y0, x1, y1) = self.pixel_bounds(rect);
        for y in y0..y1 {
            for x in x0..x1 {
                if inside_rounded(&placed, radius, x as f32 + 0.5, y as f32 + 0.5) {
                    self.blend(x, y, color, 1.0);
                }
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: RenderColor, line_width: f32, radius: f32) {
        if line_width <= 0.0 {
            return;
        }
        if radius > 0.0 {
            let placed = rect.translate(self.state.dx, self.state.dy);
            let (_, y0, _, y1) = self.pixel_bounds(rect.inflate(line_width / 2.0));
            for y in y0..y1 {
                for (left, right) in placed.outline_spans(line_width, radius, y as f32 + 0.5) {
                    let x0 = (left.round() as i32).max(0);
                    let x1 = (right.round() as i32).min(self.width as i32);
                    for x in x0..x1 {
                        self.blend(x, y, color, 1.0);
                    }
                }
            }
            return;
        }
        let half = line_width / 2.0;
        let outer = Rect::new(
            rect.x - half,
            rect.y - half,
            rect.width + line_width,
            rect.height + line_width,
        );
        let inner_height = (outer.height - 2.0 * line_width).max(0.0);
        self.fill_plain(Rect::new(outer.x, outer.y, outer.width, line_width), color);
        self.fill_plain(
            Rect::new(outer.x, outer.bottom() - line_width, outer.width, line_width),
            color,
        );
        self.fill_plain(
            Rect::new(outer.x, outer.y + line_width, line_width, inner_height),
            color,
        );
        self.fill_plain(
            Rect::new(outer.right() - line_width, outer.y + line_width, line_width, inner_height),
            color,
        );
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let mut font = font.borrow_mut();
        let size = style.font.size;
        let width = font.measure_text(text, size);
        let baseline = style
            .baseline
            .baseline_y(y, font.ascent(size), font.descent(size))
            + self.state.dy;
        let mut cursor_x = x + style.align.offset(width) + self.state.dx;

        for c in text.chars() {
            let glyph = font.rasterize(c, size).clone();
            let glyph_x = cursor_x.round() as i32 + glyph.offset_x;
            let glyph_y = baseline.round() as i32 - glyph.offset_y - glyph.height as i32;
            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let coverage = glyph.bitmap[(row * glyph.width + col) as usize] as f32 / 255.0;
                    if coverage > 0.0 {
                        self.blend(glyph_x + col as i32, glyph_y + row as i32, style.color, coverage);
                    }
                }
            }
            cursor_x += glyph.advance_width;
        }
    }

    fn draw_image(&mut self, image: &Arc<ImagePixels>, source: Rect, destination: Rect) {
        if source.is_empty() || destination.is_empty() {
            return;
        }
        let placed = destination.translate(self.state.dx, self.state.dy);
        let (x0, y0, x1, y1) = self.pixel_bounds(destination);
        let scale_x = source.width / placed.width;
        let scale_y = source.height / placed.height;
        let max_x = (source.right().ceil() as i64 - 1).min(image.width as i64 - 1);
        let max_y = (source.bottom().ceil() as i64 - 1).min(image.height as i64 - 1);
        if max_x < 0 || max_y < 0 {
            return;
        }

        for y in y0..y1 {
            let sy = (source.y + (y as f32 + 0.5 - placed.y) * scale_y).floor() as i64;
            let sy = sy.clamp(source.y.max(0.0) as i64, max_y) as u32;
            for x in x0..x1 {
                let sx = (source.x + (x as f32 + 0.5 - placed.x) * scale_x).floor() as i64;
                let sx = sx.clamp(source.x.max(0.0) as i64, max_x) as u32;
                if let Some([r, g, b, a]) = image.pixel(sx, sy) {
                    self.blend(x, y, RenderColor::new(r, g, b, a), 1.0);
                }
            }
        }
    }
}
