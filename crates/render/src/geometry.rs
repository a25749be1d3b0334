//! Geometry primitives

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A point in surface space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if a point is inside the rectangle (half-open on the far edges)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Same rectangle moved by an offset
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlapping area of two rectangles, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Grown by `by` on every side (shrunk when negative)
    pub fn inflate(&self, by: f32) -> Rect {
        Rect::new(
            self.x - by,
            self.y - by,
            (self.width + 2.0 * by).max(0.0),
            (self.height + 2.0 * by).max(0.0),
        )
    }

    /// Horizontal extent of this rectangle with rounded corners along line `y`
    pub fn rounded_span(&self, radius: f32, y: f32) -> Option<(f32, f32)> {
        if self.is_empty() || y < self.y || y >= self.bottom() {
            return None;
        }
        let r = radius.max(0.0).min(self.width / 2.0).min(self.height / 2.0);
        let dy = if y < self.y + r {
            self.y + r - y
        } else if y > self.bottom() - r {
            y - (self.bottom() - r)
        } else {
            0.0
        };
        let inset = r - (r * r - dy * dy).max(0.0).sqrt();
        Some((self.x + inset, self.right() - inset))
    }

    /// Spans covered along line `y` by an outline centered on the edges of
    /// this rectangle with rounded corners
    pub fn outline_spans(&self, line_width: f32, radius: f32, y: f32) -> SmallVec<[(f32, f32); 2]> {
        let half = line_width / 2.0;
        let mut spans = SmallVec::new();
        let Some((left, right)) = self.inflate(half).rounded_span(radius + half, y) else {
            return spans;
        };
        match self.inflate(-half).rounded_span((radius - half).max(0.0), y) {
            Some((inner_left, inner_right)) => {
                spans.push((left, inner_left));
                spans.push((inner_right, right));
            }
            None => spans.push((left, right)),
        }
        spans
    }
}
