use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An sRGB color with components in `[0, 1]`.
///
/// Serializes as a `"#rrggbb"` string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseColorError {
    #[error("color must look like #rrggbb, got {0:?}")]
    Malformed(String),
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Convert to linear light, as expected by lighting math and sRGB render targets.
    pub fn to_linear(&self) -> [f32; 3] {
        [srgb_to_linear(self.r), srgb_to_linear(self.g), srgb_to_linear(self.b)]
    }

    /// Linear color scaled by an intensity, padded for a uniform slot.
    pub fn to_linear_scaled(&self, intensity: f32) -> [f32; 4] {
        let [r, g, b] = self.to_linear();
        [r * intensity, g * intensity, b * intensity, 1.0]
    }

    pub fn to_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 {
            return Err(ParseColorError::Malformed(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| ParseColorError::Malformed(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        format!("{color}")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_components() {
        let c = Color::from_hex(0x108020);
        assert!((c.r - 16.0 / 255.0).abs() < 1e-6);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 32.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.to_hex(), 0x108020);
    }

    #[test]
    fn parse_with_and_without_prefix() {
        assert_eq!("#b0b0b0".parse::<Color>().unwrap().to_hex(), 0xb0b0b0);
        assert_eq!("0x202020".parse::<Color>().unwrap().to_hex(), 0x202020);
        assert_eq!("ffffff".parse::<Color>().unwrap(), Color::WHITE);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn display_is_lowercase_hex() {
        assert_eq!(Color::from_hex(0xB0B0B0).to_string(), "#b0b0b0");
    }

    #[test]
    fn linear_conversion_keeps_endpoints() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let [r, _, _] = Color::WHITE.to_linear();
        assert!((r - 1.0).abs() < 1e-6);
        // mid grey darkens in linear space
        let [g, _, _] = Color::from_hex(0x808080).to_linear();
        assert!(g < 0.5);
    }
}
