//! SDL2 Render Backend
//!
//! Replays display lists onto an accelerated SDL2 window canvas.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use rustc_hash::FxHashMap;
use sdl2::pixels::{Color as SdlColor, PixelFormatEnum};
use sdl2::rect::Rect as SdlRect;
use sdl2::render::{BlendMode, Canvas, Texture, TextureCreator};
use sdl2::video::{Window, WindowContext};
use sdl2::{EventPump, Sdl};

use crate::display_list::{DisplayList, PaintCommand};
use crate::error::{RenderError, RenderResult};
use crate::font::FontCache;
use crate::geometry::Rect;
use crate::image::ImagePixels;
use crate::paint::RenderColor;
use crate::text::TextStyle;
use crate::RenderBackend;

/// Glyph texture key: character and size in tenths of a pixel
type GlyphKey = (char, u32);

/// SDL2-based render backend
pub struct SdlBackend {
    sdl_context: Sdl,
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    font: Option<Rc<RefCell<FontCache>>>,
    /// Uploaded decoded images, keyed by image id
    images: FxHashMap<u64, Texture>,
    /// Streaming textures for snapshots, keyed by size
    scratch: FxHashMap<(u32, u32), Texture>,
    uploads: UploadTracker,
    /// White glyph masks tinted with color mod at draw time
    glyphs: FxHashMap<GlyphKey, Option<Texture>>,
    width: u32,
    height: u32,
}

impl SdlBackend {
    /// Create a new SDL backend with a window of `width` x `height` logical pixels
    ///
    /// `scale` multiplies the physical window size.
    pub fn new(title: &str, width: u32, height: u32, scale: f32) -> RenderResult<Self> {
        let sdl_context = sdl2::init().map_err(RenderError::Sdl)?;
        let video_subsystem = sdl_context.video().map_err(RenderError::Sdl)?;

        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let window = video_subsystem
            .window(
                title,
                ((width as f32) * scale).round() as u32,
                ((height as f32) * scale).round() as u32,
            )
            .position_centered()
            .build()
            .map_err(|e| RenderError::Sdl(e.to_string()))?;

        let mut canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(|e| RenderError::Sdl(e.to_string()))?;
        canvas.set_scale(scale, scale).map_err(RenderError::Sdl)?;
        canvas.set_blend_mode(BlendMode::Blend);

        let texture_creator = canvas.texture_creator();
        debug!("Created {}x{} window (scale {})", width, height, scale);

        Ok(Self {
            sdl_context,
            canvas,
            texture_creator,
            font: None,
            images: FxHashMap::default(),
            scratch: FxHashMap::default(),
            uploads: UploadTracker::default(),
            glyphs: FxHashMap::default(),
            width,
            height,
        })
    }

    /// Get the SDL context for event handling
    pub fn sdl_context(&self) -> &Sdl {
        &self.sdl_context
    }

    /// Take the window's event pump
    pub fn event_pump(&self) -> RenderResult<EventPump> {
        self.sdl_context.event_pump().map_err(RenderError::Sdl)
    }

    /// Set the face used for text
    pub fn set_font(&mut self, font: Option<Rc<RefCell<FontCache>>>) {
        self.font = font;
        self.glyphs.clear();
    }

    /// Shared handle to the current face
    pub fn font(&self) -> Option<Rc<RefCell<FontCache>>> {
        self.font.clone()
    }

    /// Number of decoded images uploaded as textures
    pub fn cached_textures(&self) -> usize {
        self.images.len()
    }

    fn set_color(&mut self, color: RenderColor) {
        self.canvas
            .set_draw_color(SdlColor::RGBA(color.r, color.g, color.b, color.a));
    }

    fn fill_rect(&mut self, rect: Rect, color: RenderColor, radius: f32) {
        self.set_color(color);
        if radius <= 0.0 {
            if let Some(r) = to_sdl_rect(rect) {
                let _ = self.canvas.fill_rect(r);
            }
            return;
        }

        // Rounded corners as one span per row
        let (top, bottom) = (rect.y.round() as i32, rect.bottom().round() as i32);
        for row in top..bottom {
            if let Some((left, right)) = rect.rounded_span(radius, row as f32 + 0.5) {
                self.fill_span(row, left, right);
            }
        }
    }

    fn fill_span(&mut self, row: i32, left: f32, right: f32) {
        if let Some(span) = to_sdl_rect(Rect::new(left, row as f32, right - left, 1.0)) {
            let _ = self.canvas.fill_rect(span);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: RenderColor, line_width: f32, radius: f32) {
        if line_width <= 0.0 {
            return;
        }
        if radius > 0.0 {
            self.set_color(color);
            let outer = rect.inflate(line_width / 2.0);
            for row in outer.y.round() as i32..outer.bottom().round() as i32 {
                for (left, right) in rect.outline_spans(line_width, radius, row as f32 + 0.5) {
                    self.fill_span(row, left, right);
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
        let sides = [
            Rect::new(outer.x, outer.y, outer.width, line_width),
            Rect::new(outer.x, outer.bottom() - line_width, outer.width, line_width),
            Rect::new(outer.x, outer.y + line_width, line_width, inner_height),
            Rect::new(outer.right() - line_width, outer.y + line_width, line_width, inner_height),
        ];
        self.set_color(color);
        for side in sides {
            if let Some(side) = to_sdl_rect(side) {
                let _ = self.canvas.fill_rect(side);
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let Some(font) = self.font.clone() else {
            return;
        };
        let mut font = font.borrow_mut();
        let size = style.font.size;
        let width = font.measure_text(text, size);
        let baseline = style
            .baseline
            .baseline_y(y, font.ascent(size), font.descent(size))
            .round() as i32;
        let mut cursor_x = x + style.align.offset(width);
        let color = style.color;

        for c in text.chars() {
            let glyph = font.rasterize(c, size);
            let key = (c, (size * 10.0) as u32);
            let (glyph_w, glyph_h) = (glyph.width, glyph.height);
            let glyph_x = cursor_x.round() as i32 + glyph.offset_x;
            let glyph_y = baseline - glyph.offset_y - glyph_h as i32;
            let advance = glyph.advance_width;

            if !self.glyphs.contains_key(&key) {
                let texture = upload_glyph(&self.texture_creator, &glyph.bitmap, glyph_w, glyph_h);
                self.glyphs.insert(key, texture);
            }
            if let Some(Some(texture)) = self.glyphs.get_mut(&key) {
                texture.set_color_mod(color.r, color.g, color.b);
                texture.set_alpha_mod(color.a);
                let _ = self
                    .canvas
                    .copy(texture, None, SdlRect::new(glyph_x, glyph_y, glyph_w, glyph_h));
            }

            cursor_x += advance;
        }
    }

    fn draw_image(&mut self, image: &ImagePixels, source: Rect, destination: Rect, alpha: f32) {
        let (Some(src), Some(dst)) = (to_sdl_rect(source), to_sdl_rect(destination)) else {
            return;
        };
        if image.width == 0 || image.height == 0 {
            return;
        }

        let texture = if image.stable {
            if !self.images.contains_key(&image.id) {
                match upload_image(&self.texture_creator, image) {
                    Ok(texture) => {
                        self.images.insert(image.id, texture);
                    }
                    Err(e) => {
                        warn!("Failed to upload image {}: {}", image.id, e);
                        return;
                    }
                }
            }
            self.images.get_mut(&image.id)
        } else {
            let size = (image.width, image.height);
            if !self.scratch.contains_key(&size) {
                match create_streaming(&self.texture_creator, image.width, image.height) {
                    Ok(texture) => {
                        self.scratch.insert(size, texture);
                    }
                    Err(e) => {
                        warn!("Failed to create scratch texture: {}", e);
                        return;
                    }
                }
            }
            let Some(texture) = self.scratch.get_mut(&size) else {
                return;
            };
            // A snapshot is drawn once per region; upload it only the first time
            if self.uploads.claim(size, image.id)
                && texture
                    .update(None, &image.data, (image.width * 4) as usize)
                    .is_err()
            {
                self.uploads.forget(size);
                return;
            }
            Some(texture)
        };

        if let Some(texture) = texture {
            texture.set_alpha_mod((alpha.clamp(0.0, 1.0) * 255.0).round() as u8);
            let _ = self.canvas.copy(texture, src, dst);
        }
    }
}

/// Which snapshot each streaming texture currently holds
#[derive(Debug, Default)]
struct UploadTracker {
    held: FxHashMap<(u32, u32), u64>,
}

impl UploadTracker {
    /// Record image `id` as the contents of the texture for `size`, returning
    /// whether it still has to be uploaded
    fn claim(&mut self, size: (u32, u32), id: u64) -> bool {
        self.held.insert(size, id) != Some(id)
    }

    fn forget(&mut self, size: (u32, u32)) {
        self.held.remove(&size);
    }
}

fn to_sdl_rect(rect: Rect) -> Option<SdlRect> {
    let x = rect.x.round() as i32;
    let y = rect.y.round() as i32;
    let w = (rect.right().round() as i32) - x;
    let h = (rect.bottom().round() as i32) - y;
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(SdlRect::new(x, y, w as u32, h as u32))
}

fn create_streaming(
    creator: &TextureCreator<WindowContext>,
    width: u32,
    height: u32,
) -> Result<Texture, String> {
    let mut texture = creator
        .create_texture_streaming(PixelFormatEnum::RGBA32, width, height)
        .map_err(|e| e.to_string())?;
    texture.set_blend_mode(BlendMode::Blend);
    Ok(texture)
}

fn upload_image(creator: &TextureCreator<WindowContext>, image: &ImagePixels) -> Result<Texture, String> {
    let mut texture = create_streaming(creator, image.width, image.height)?;
    texture
        .update(None, &image.data, (image.width * 4) as usize)
        .map_err(|e| e.to_string())?;
    Ok(texture)
}

fn upload_glyph(
    creator: &TextureCreator<WindowContext>,
    bitmap: &[u8],
    width: u32,
    height: u32,
) -> Option<Texture> {
    if width == 0 || height == 0 || bitmap.is_empty() {
        return None;
    }
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for &coverage in bitmap.iter().take((width * height) as usize) {
        rgba.extend_from_slice(&[255, 255, 255, coverage]);
    }
    let mut texture = create_streaming(creator, width, height).ok()?;
    texture.update(None, &rgba, (width * 4) as usize).ok()?;
    Some(texture)
}

impl RenderBackend for SdlBackend {
    fn clear(&mut self, color: RenderColor) {
        self.set_color(color);
        self.canvas.clear();
    }

    fn render(&mut self, display_list: &DisplayList) {
        for command in &display_list.commands {
            match command {
                PaintCommand::FillRect { rect, color, radius } => {
                    self.fill_rect(*rect, *color, *radius);
                }
                PaintCommand::StrokeRect {
                    rect,
                    color,
                    line_width,
                    radius,
                } => {
                    self.stroke_rect(*rect, *color, *line_width, *radius);
                }
                PaintCommand::DrawText { text, x, y, style } => {
                    self.draw_text(text, *x, *y, style);
                }
                PaintCommand::DrawImage {
                    image,
                    source,
                    destination,
                    alpha,
                } => {
                    self.draw_image(image, *source, *destination, *alpha);
                }
            }
        }
    }

    fn present(&mut self) {
        self.canvas.present();
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_uploaded_once_per_image() {
        let mut uploads = UploadTracker::default();
        let first = ImagePixels::snapshot(4, 4, vec![0; 64]);
        let second = ImagePixels::snapshot(4, 4, vec![0; 64]);

        // Nine regions of one snapshot share a single upload
        let count = (0..9).filter(|_| uploads.claim((4, 4), first.id)).count();
        assert_eq!(count, 1);

        assert!(uploads.claim((4, 4), second.id));
        assert!(uploads.claim((8, 8), second.id));
        assert!(!uploads.claim((4, 4), second.id));
    }

    #[test]
    fn test_failed_upload_is_retried() {
        let mut uploads = UploadTracker::default();
        assert!(uploads.claim((2, 2), 7));
        uploads.forget((2, 2));
        assert!(uploads.claim((2, 2), 7));
    }

    #[test]
    fn test_to_sdl_rect_rounds_edges() {
        assert_eq!(to_sdl_rect(Rect::new(0.4, 0.6, 2.0, 2.0)), Some(SdlRect::new(0, 1, 2, 2)));
        assert_eq!(to_sdl_rect(Rect::new(1.0, 1.0, 0.2, 5.0)), None);
    }
}
