use serde::{Deserialize, Serialize};
use std::fmt;

/// A single straight-alpha RGBA8 pixel, `[r, g, b, a]`.
pub type Rgba = [u8; 4];

/// Normalized straight-alpha color, each channel in `[0.0, 1.0]`.
///
/// Frames store [`Rgba`] bytes; `Color` is the configuration-facing form
/// (`"#rrggbb"` / `"#rrggbbaa"` strings in the engine config).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::opaque(1.0, 1.0, 1.0);
    pub const RED: Color = Color::opaque(1.0, 0.0, 0.0);
    pub const BLUE: Color = Color::opaque(0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_rgba8([r, g, b, a]: Rgba) -> Self {
        let unit = |c: u8| c as f32 / 255.0;
        Self::new(unit(r), unit(g), unit(b), unit(a))
    }

    /// Parse `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
    pub fn from_hex(text: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(text.to_string());
        let digits = text.strip_prefix('#').unwrap_or(text);
        if !digits.is_ascii() || !matches!(digits.len(), 6 | 8) {
            return Err(invalid());
        }

        let mut px: Rgba = [0, 0, 0, 255];
        for (slot, pair) in px.iter_mut().zip(digits.as_bytes().chunks(2)) {
            // ASCII was checked above, so the pair is valid UTF-8.
            let pair = std::str::from_utf8(pair).map_err(|_| invalid())?;
            *slot = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        Ok(Self::from_rgba8(px))
    }

    /// Quantize to 8-bit channels, clamping out-of-range components.
    pub fn to_rgba8(&self) -> Rgba {
        let byte = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        [byte(self.r), byte(self.g), byte(self.b), byte(self.a)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        write!(f, "#{r:02X}{g:02X}{b:02X}")?;
        if a != 255 {
            write!(f, "{a:02X}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color '{0}', expected #rrggbb or #rrggbbaa")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_without_alpha_is_opaque() {
        let c = Color::from_hex("#FF8800").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 255]);
        assert_eq!(Color::from_hex("ff8800").unwrap(), c);
    }

    #[test]
    fn test_hex_with_alpha() {
        let c = Color::from_hex("#FF880080").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 128]);
    }

    #[test]
    fn test_malformed_hex_is_rejected() {
        for text in ["invalid", "#GG0000", "#ÄÄ00", "#FFF", "#FF00FF0"] {
            assert!(Color::from_hex(text).is_err(), "{text} should not parse");
        }
        let err = Color::from_hex("teal").unwrap_err();
        assert!(err.to_string().contains("teal"));
    }

    #[test]
    fn test_rgba8_round_trip_is_exact() {
        let px = [12, 200, 37, 91];
        assert_eq!(Color::from_rgba8(px).to_rgba8(), px);
    }

    #[test]
    fn test_display_omits_opaque_alpha() {
        assert_eq!(Color::RED.to_string(), "#FF0000");
        assert_eq!(Color::new(1.0, 0.0, 0.0, 0.5).to_string(), "#FF000080");
        assert_eq!(Color::TRANSPARENT.to_string(), "#00000000");
    }
}
