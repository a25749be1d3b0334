//! Display List
//!
//! A `Surface` that records paint commands in absolute window coordinates,
//! replayed by a `RenderBackend`.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::geometry::Rect;
use crate::image::ImagePixels;
use crate::paint::RenderColor;
use crate::text::TextStyle;
use crate::Surface;

/// A display list of paint commands
#[derive(Debug, Clone)]
pub struct DisplayList {
    pub commands: Vec<PaintCommand>,
    state: DrawState,
    saved: SmallVec<[DrawState; 8]>,
}

/// A paint command
#[derive(Debug, Clone)]
pub enum PaintCommand {
    /// Fill a rectangle with a solid color
    FillRect {
        rect: Rect,
        color: RenderColor,
        radius: f32,
    },
    /// Outline a rectangle
    StrokeRect {
        rect: Rect,
        color: RenderColor,
        line_width: f32,
        radius: f32,
    },
    /// Draw text anchored at a point
    DrawText {
        text: String,
        x: f32,
        y: f32,
        style: TextStyle,
    },
    /// Draw a region of an image
    DrawImage {
        image: Arc<ImagePixels>,
        source: Rect,
        destination: Rect,
        alpha: f32,
    },
}

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

impl DisplayList {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            state: DrawState::default(),
            saved: SmallVec::new(),
        }
    }

    pub fn push(&mut self, command: PaintCommand) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop all commands and reset the transform, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
        self.state = DrawState::default();
        self.saved.clear();
    }

    fn place(&self, rect: Rect) -> Rect {
        rect.translate(self.state.dx, self.state.dy)
    }
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for DisplayList {
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
        let color = color.with_opacity(self.state.alpha);
        if color.is_transparent() {
            return;
        }
        let rect = self.place(rect);
        self.push(PaintCommand::FillRect { rect, color, radius });
    }

    fn stroke_rect(&mut self, rect: Rect, color: RenderColor, line_width: f32, radius: f32) {
        let color = color.with_opacity(self.state.alpha);
        if color.is_transparent() || line_width <= 0.0 {
            return;
        }
        let rect = self.place(rect);
        self.push(PaintCommand::StrokeRect {
            rect,
            color,
            line_width,
            radius,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, style: &TextStyle) {
        let mut style = style.clone();
        style.color = style.color.with_opacity(self.state.alpha);
        self.push(PaintCommand::DrawText {
            text: text.to_string(),
            x: x + self.state.dx,
            y: y + self.state.dy,
            style,
        });
    }

    fn draw_image(&mut self, image: &Arc<ImagePixels>, source: Rect, destination: Rect) {
        if self.state.alpha <= 0.0 {
            return;
        }
        let destination = self.place(destination);
        self.push(PaintCommand::DrawImage {
            image: Arc::clone(image),
            source,
            destination,
            alpha: self.state.alpha,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_list_new() {
        let list = DisplayList::new();
        assert!(list.is_empty());
    }

    #[test]
    fn test_display_list_push() {
        let mut list = DisplayList::new();
        list.push(PaintCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            color: RenderColor::BLACK,
            radius: 0.0,
        });
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_translation_is_absolute() {
        let mut list = DisplayList::new();
        list.save();
        list.translate(10.0, 20.0);
        list.save();
        list.translate(5.0, 5.0);
        list.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), RenderColor::WHITE, 0.0);
        list.restore();
        list.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), RenderColor::WHITE, 0.0);
        list.restore();
        list.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), RenderColor::WHITE, 0.0);

        let rects: Vec<Rect> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(rects[0], Rect::new(16.0, 26.0, 2.0, 2.0));
        assert_eq!(rects[1], Rect::new(11.0, 21.0, 2.0, 2.0));
        assert_eq!(rects[2], Rect::new(1.0, 1.0, 2.0, 2.0));
    }

    #[test]
    fn test_alpha_multiplies_and_skips_invisible() {
        let mut list = DisplayList::new();
        list.multiply_alpha(0.5);
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), RenderColor::WHITE, 0.0);
        list.multiply_alpha(0.0);
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), RenderColor::WHITE, 0.0);

        assert_eq!(list.len(), 1);
        match &list.commands[0] {
            PaintCommand::FillRect { color, .. } => assert_eq!(color.a, 128),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let mut list = DisplayList::new();
        list.translate(3.0, 3.0);
        list.restore();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), RenderColor::WHITE, 0.0);
        match &list.commands[0] {
            PaintCommand::FillRect { rect, .. } => assert_eq!(rect.x, 3.0),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
