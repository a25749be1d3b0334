//! Paint primitives
//!
//! Colors, parsed from the CSS forms game scripts use.

use std::str::FromStr;

/// Color for rendering (RGBA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const NAMED_COLORS: &[(&str, RenderColor)] = &[
    ("black", RenderColor::rgb(0, 0, 0)),
    ("white", RenderColor::rgb(255, 255, 255)),
    ("red", RenderColor::rgb(255, 0, 0)),
    ("orange", RenderColor::rgb(255, 165, 0)),
    ("yellow", RenderColor::rgb(255, 255, 0)),
    ("green", RenderColor::rgb(0, 128, 0)),
    ("lime", RenderColor::rgb(0, 255, 0)),
    ("blue", RenderColor::rgb(0, 0, 255)),
    ("indigo", RenderColor::rgb(75, 0, 130)),
    ("violet", RenderColor::rgb(238, 130, 238)),
    ("purple", RenderColor::rgb(128, 0, 128)),
    ("cyan", RenderColor::rgb(0, 255, 255)),
    ("magenta", RenderColor::rgb(255, 0, 255)),
    ("gray", RenderColor::rgb(128, 128, 128)),
    ("grey", RenderColor::rgb(128, 128, 128)),
    ("silver", RenderColor::rgb(192, 192, 192)),
    ("brown", RenderColor::rgb(165, 42, 42)),
    ("pink", RenderColor::rgb(255, 192, 203)),
    ("transparent", RenderColor::new(0, 0, 0, 0)),
];

impl RenderColor {
    pub const BLACK: RenderColor = RenderColor::rgb(0, 0, 0);
    pub const WHITE: RenderColor = RenderColor::rgb(255, 255, 255);
    pub const RED: RenderColor = RenderColor::rgb(255, 0, 0);
    pub const TRANSPARENT: RenderColor = RenderColor::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Check if color is fully transparent
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Same color with its alpha scaled by `alpha` (0.0 to 1.0)
    pub fn with_opacity(self, alpha: f32) -> Self {
        let alpha = alpha.clamp(0.0, 1.0);
        Self {
            a: (self.a as f32 * alpha).round() as u8,
            ..self
        }
    }

    /// Parse a CSS color: a keyword, `#rgb`, `#rrggbb`, `#rrggbbaa`,
    /// `rgb(r, g, b)` or `rgba(r, g, b, a)`
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let lower = input.to_ascii_lowercase();

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex);
        }

        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args);
        }

        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, color)| *color)
    }
}

fn parse_hex(hex: &str) -> Option<RenderColor> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => Some(RenderColor::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
        6 => Some(RenderColor::rgb(pair(0)?, pair(2)?, pair(4)?)),
        8 => Some(RenderColor::new(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<RenderColor> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0).round() as u8);
    match parts.as_slice() {
        [r, g, b] => Some(RenderColor::rgb(channel(r)?, channel(g)?, channel(b)?)),
        [r, g, b, a] => {
            let alpha = a.parse::<f32>().ok()?.clamp(0.0, 1.0);
            Some(RenderColor::new(
                channel(r)?,
                channel(g)?,
                channel(b)?,
                (alpha * 255.0).round() as u8,
            ))
        }
        _ => None,
    }
}

impl FromStr for RenderColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RenderColor::parse(s).ok_or_else(|| format!("invalid color: {}", s))
    }
}

impl Default for RenderColor {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_color() {
        let c = RenderColor::rgb(255, 0, 0);
        assert_eq!(c, RenderColor::RED);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_transparent() {
        assert!(RenderColor::TRANSPARENT.is_transparent());
        assert!(!RenderColor::BLACK.is_transparent());
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(RenderColor::parse("white"), Some(RenderColor::WHITE));
        assert_eq!(RenderColor::parse("Indigo"), Some(RenderColor::rgb(75, 0, 130)));
        assert_eq!(RenderColor::parse("not-a-color"), None);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(RenderColor::parse("#fff"), Some(RenderColor::WHITE));
        assert_eq!(RenderColor::parse("#102030"), Some(RenderColor::rgb(16, 32, 48)));
        assert_eq!(RenderColor::parse("#10203080"), Some(RenderColor::new(16, 32, 48, 128)));
        assert_eq!(RenderColor::parse("#12"), None);
    }

    #[test]
    fn test_parse_rgba() {
        assert_eq!(
            RenderColor::parse("rgba(0, 0, 255, .5)"),
            Some(RenderColor::new(0, 0, 255, 128))
        );
        assert_eq!(RenderColor::parse("rgb(1,2,3)"), Some(RenderColor::rgb(1, 2, 3)));
        assert_eq!(RenderColor::parse("rgb(1,2)"), None);
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(RenderColor::WHITE.with_opacity(0.5).a, 128);
        assert_eq!(RenderColor::WHITE.with_opacity(2.0).a, 255);
    }

    #[test]
    fn test_from_str() {
        let color: RenderColor = "red".parse().unwrap();
        assert_eq!(color, RenderColor::RED);
        assert!("nope".parse::<RenderColor>().is_err());
    }
}
