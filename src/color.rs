//! Linear RGB colors for point vertex data.
//!
//! Colors are stored in linear space, which is what the GPU blends in and what
//! an sRGB surface expects as fragment output. Hex strings coming from a color
//! picker are sRGB-encoded and get decoded on the way in.

use crate::error::ColorParseError;

/// A linear RGB color with components nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    /// Create a color from linear components.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse an sRGB hex string (`#rrggbb` or `rrggbb`) into linear space.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 {
            return Err(ColorParseError::Length(digits.len()));
        }

        let value = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError::InvalidDigit(hex.to_string()))?;

        Ok(Self::from_srgb8(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    /// Build a linear color from 8-bit sRGB channels.
    pub fn from_srgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            srgb_to_linear(r as f32 / 255.0),
            srgb_to_linear(g as f32 / 255.0),
            srgb_to_linear(b as f32 / 255.0),
        )
    }

    /// Encode back to 8-bit sRGB channels.
    pub fn to_srgb8(self) -> [u8; 3] {
        let encode = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
        [encode(self.r), encode(self.g), encode(self.b)]
    }

    /// Format as an sRGB `#rrggbb` string.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_srgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// Channel-wise linear interpolation towards `other`.
    ///
    /// `t = 0` returns `self` and `t = 1` returns `other` exactly.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let s = 1.0 - t;
        Self::new(
            self.r * s + other.r * t,
            self.g * s + other.g * t,
            self.b * s + other.b * t,
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn from_array([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Color> for [f32; 3] {
    fn from(c: Color) -> Self {
        c.to_array()
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
