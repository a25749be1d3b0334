//! Easel Render Engine
//!
//! Drawing surfaces, display lists and the SDL2 window backend.

mod display_list;
mod error;
mod font;
mod geometry;
mod image;
mod paint;
mod raster;
mod sdl_backend;
mod text;

use std::sync::Arc;

pub use display_list::{DisplayList, PaintCommand};
pub use error::{RenderError, RenderResult};
pub use font::{FontCache, GlyphData};
pub use geometry::{Point, Rect};
pub use image::ImagePixels;
pub use paint::RenderColor;
pub use raster::Raster;
pub use sdl_backend::SdlBackend;
pub use text::{FontSpec, TextAlign, TextBaseline, TextStyle};

/// A 2D drawing target with a canvas-like state stack
///
/// Coordinates are in the current translated frame. `save`/`restore` bracket
/// translation and alpha changes.
pub trait Surface {
    /// Push the current translation and alpha
    fn save(&mut self);

    /// Pop back to the last saved translation and alpha
    fn restore(&mut self);

    /// Move the origin of the current frame
    fn translate(&mut self, dx: f32, dy: f32);

    /// Multiply the current alpha (0.0 to 1.0)
    fn multiply_alpha(&mut self, alpha: f32);

    /// Fill a rectangle, with rounded corners when `radius > 0`
    fn fill_rect(&mut self, rect: Rect, color: RenderColor, radius: f32);

    /// Outline a rectangle, centered on its edges, with rounded corners when
    /// `radius > 0`
    fn stroke_rect(&mut self, rect: Rect, color: RenderColor, line_width: f32, radius: f32);

    /// Draw text anchored at (x, y) according to the style's align and baseline
    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle);

    /// Copy `source` (image pixel space) of an image into `destination`
    fn draw_image(&mut self, image: &Arc<ImagePixels>, source: Rect, destination: Rect);
}

/// Trait for render backends
pub trait RenderBackend {
    /// Clear the screen with a color
    fn clear(&mut self, color: RenderColor);

    /// Execute a display list
    fn render(&mut self, display_list: &DisplayList);

    /// Present the rendered frame
    fn present(&mut self);

    /// Get the window width
    fn width(&self) -> u32;

    /// Get the window height
    fn height(&self) -> u32;
}
