//! Text styling
//!
//! Canvas-style text alignment: the anchor point passed to `fill_text` is
//! interpreted through `TextAlign` horizontally and `TextBaseline` vertically.

use crate::paint::RenderColor;

/// Default font size in pixels
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Horizontal text alignment relative to the anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// X offset of the text's left edge from the anchor
    pub fn offset(self, text_width: f32) -> f32 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => -text_width / 2.0,
            TextAlign::Right => -text_width,
        }
    }
}

/// Vertical text alignment relative to the anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Alphabetic,
    Bottom,
}

impl TextBaseline {
    /// Y of the glyph baseline for an anchor y
    ///
    /// `ascent` is positive, `descent` negative (fontdue line metrics).
    pub fn baseline_y(self, anchor_y: f32, ascent: f32, descent: f32) -> f32 {
        match self {
            TextBaseline::Top => anchor_y + ascent,
            TextBaseline::Middle => anchor_y + (ascent + descent) / 2.0,
            TextBaseline::Alphabetic => anchor_y,
            TextBaseline::Bottom => anchor_y + descent,
        }
    }
}

/// Font request: size and family name
///
/// Only one face is loaded at a time, so the family is informational.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub family: String,
}

impl FontSpec {
    pub fn new(size: f32, family: impl Into<String>) -> Self {
        Self {
            size,
            family: family.into(),
        }
    }

    /// Parse a CSS font shorthand such as `24px Courier New`
    ///
    /// Falls back to the default size when no `px` size is present.
    pub fn parse(input: &str) -> Self {
        let mut size = None;
        let mut family = Vec::new();
        for part in input.split_whitespace() {
            match part.strip_suffix("px").and_then(|n| n.parse::<f32>().ok()) {
                Some(px) if size.is_none() => size = Some(px),
                _ => family.push(part),
            }
        }
        Self {
            size: size.unwrap_or(DEFAULT_FONT_SIZE),
            family: family.join(" "),
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(DEFAULT_FONT_SIZE, "sans-serif")
    }
}

impl From<&str> for FontSpec {
    fn from(s: &str) -> Self {
        FontSpec::parse(s)
    }
}

/// Everything needed to draw a run of text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyle {
    pub color: RenderColor,
    pub font: FontSpec,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_font() {
        let font = FontSpec::parse("25px Courier New");
        assert_eq!(font.size, 25.0);
        assert_eq!(font.family, "Courier New");
    }

    #[test]
    fn test_parse_font_without_size() {
        let font = FontSpec::parse("monospace");
        assert_eq!(font.size, DEFAULT_FONT_SIZE);
        assert_eq!(font.family, "monospace");
    }

    #[test]
    fn test_align_offset() {
        assert_eq!(TextAlign::Left.offset(40.0), 0.0);
        assert_eq!(TextAlign::Center.offset(40.0), -20.0);
        assert_eq!(TextAlign::Right.offset(40.0), -40.0);
    }

    #[test]
    fn test_baseline() {
        assert_eq!(TextBaseline::Top.baseline_y(10.0, 8.0, -2.0), 18.0);
        assert_eq!(TextBaseline::Middle.baseline_y(10.0, 8.0, -2.0), 13.0);
        assert_eq!(TextBaseline::Alphabetic.baseline_y(10.0, 8.0, -2.0), 10.0);
        assert_eq!(TextBaseline::Bottom.baseline_y(10.0, 8.0, -2.0), 8.0);
    }
}
