//! Marker colors.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Color must start with '#': {0}")]
    MissingHash(String),
    #[error("Unsupported color length in {0} (expected #rgb, #rrggbb or #rrggbbaa)")]
    BadLength(String),
    #[error("Invalid hex digits in {0}")]
    BadDigits(String),
}

/// RGBA8 color, stored on the wire as a `#rrggbb` / `#rrggbbaa` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MarkerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl MarkerColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Result<Self, ColorError> {
        let hex = color
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(color.to_string()))?;

        let byte = |range: std::ops::Range<usize>| -> Result<u8, ColorError> {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| ColorError::BadDigits(color.to_string()))
        };

        match hex.len() {
            3 => Ok(Self::rgb(
                byte(0..1)? * 17,
                byte(1..2)? * 17,
                byte(2..3)? * 17,
            )),
            6 => Ok(Self::rgb(byte(0..2)?, byte(2..4)?, byte(4..6)?)),
            8 => Ok(Self::new(byte(0..2)?, byte(2..4)?, byte(4..6)?, byte(6..8)?)),
            _ => Err(ColorError::BadLength(color.to_string())),
        }
    }

    /// Hex representation; the alpha byte is omitted when fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Scale the alpha channel by `factor` (clamped to `0.0..=1.0`).
    pub fn with_opacity(self, factor: f64) -> Self {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            a: (self.a as f64 * factor).round() as u8,
            ..self
        }
    }
}

impl Default for MarkerColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for MarkerColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for MarkerColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<MarkerColor> for String {
    fn from(color: MarkerColor) -> Self {
        color.to_hex()
    }
}

impl From<Color> for MarkerColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<MarkerColor> for Color {
    fn from(color: MarkerColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}
