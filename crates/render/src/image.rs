//! Decoded image pixels

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::geometry::Rect;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// RGBA8 pixel data
///
/// `stable` images never change after creation (decoded assets), so backends
/// may cache uploads keyed by `id`.
#[derive(Clone, PartialEq)]
pub struct ImagePixels {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub stable: bool,
}

impl ImagePixels {
    /// Wrap decoded RGBA8 data
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            data,
            stable: true,
        }
    }

    /// Pixels copied out of a mutable buffer
    pub fn snapshot(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            stable: false,
            ..Self::new(width, height, data)
        }
    }

    /// The whole image as a rectangle
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// RGBA at a pixel, if in range
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

impl fmt::Debug for ImagePixels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePixels")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stable", &self.stable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids() {
        let a = ImagePixels::new(1, 1, vec![0; 4]);
        let b = ImagePixels::new(1, 1, vec![0; 4]);
        assert_ne!(a.id, b.id);
        assert!(a.stable);
        assert!(!ImagePixels::snapshot(1, 1, vec![0; 4]).stable);
    }

    #[test]
    fn test_pixel_lookup() {
        let img = ImagePixels::new(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(img.pixel(1, 0), Some([5, 6, 7, 8]));
        assert_eq!(img.pixel(2, 0), None);
    }
}
