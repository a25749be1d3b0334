//! Font rendering
//!
//! Text rendering using fontdue. No face is embedded; the shell loads one
//! from the configured font path and text is skipped when none is available.

use std::path::Path;

use fontdue::{Font, FontSettings};
use rustc_hash::FxHashMap;

use crate::error::{RenderError, RenderResult};

/// Cache for rendered glyphs
pub struct FontCache {
    font: Font,
    glyph_cache: FxHashMap<GlyphKey, GlyphData>,
}

/// Key for cached glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GlyphKey {
    character: char,
    size_tenths: u32, // Font size * 10 to avoid float hashing
}

/// Cached glyph bitmap data
#[derive(Debug, Clone)]
pub struct GlyphData {
    pub width: u32,
    pub height: u32,
    pub bitmap: Vec<u8>,
    pub advance_width: f32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl FontCache {
    /// Create a font cache from font data
    pub fn from_bytes(data: &[u8]) -> RenderResult<Self> {
        let font = Font::from_bytes(data, FontSettings::default()).map_err(RenderError::Font)?;

        Ok(Self {
            font,
            glyph_cache: FxHashMap::default(),
        })
    }

    /// Load a TTF/OTF face from disk
    pub fn from_file(path: impl AsRef<Path>) -> RenderResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Rasterize a character at a given size
    pub fn rasterize(&mut self, c: char, size: f32) -> &GlyphData {
        let key = GlyphKey {
            character: c,
            size_tenths: (size * 10.0) as u32,
        };

        let font = &self.font;
        self.glyph_cache.entry(key).or_insert_with(|| {
            let (metrics, bitmap) = font.rasterize(c, size);
            GlyphData {
                width: metrics.width as u32,
                height: metrics.height as u32,
                bitmap,
                advance_width: metrics.advance_width,
                offset_x: metrics.xmin,
                offset_y: metrics.ymin,
            }
        })
    }

    /// Measure the width of a string
    pub fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|c| self.rasterize(c, size).advance_width)
            .sum()
    }

    /// Get the ascent for a font size
    pub fn ascent(&self, size: f32) -> f32 {
        match self.font.horizontal_line_metrics(size) {
            Some(m) => m.ascent,
            None => size * 0.8,
        }
    }

    /// Get the descent for a font size (negative)
    pub fn descent(&self, size: f32) -> f32 {
        match self.font.horizontal_line_metrics(size) {
            Some(m) => m.descent,
            None => -size * 0.2,
        }
    }

    /// Number of cached glyph bitmaps
    pub fn cached_glyphs(&self) -> usize {
        self.glyph_cache.len()
    }
}
