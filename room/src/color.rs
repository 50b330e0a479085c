//! Colors and the stock paint swatches.
//!
//! Colors travel as canonical lowercase `#rrggbb` strings on the wire and as
//! plain RGB channels inside the engine.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
        }
    }

    /// Channels as linear-ish floats in `[0, 1]` for shading.
    #[must_use]
    pub fn to_unit(self) -> [f64; 3] {
        [f64::from(self.r) / 255.0, f64::from(self.g) / 255.0, f64::from(self.b) / 255.0]
    }
}

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
///
/// # Errors
///
/// Returns [`ColorError::InvalidHex`] carrying the raw input.
pub fn parse_hex_rgb(raw: &str) -> Result<(u8, u8, u8), ColorError> {
    let invalid = || ColorError::InvalidHex(raw.to_string());
    let hex = raw.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => Ok((
            channel(&hex[0..1].repeat(2))?,
            channel(&hex[1..2].repeat(2))?,
            channel(&hex[2..3].repeat(2))?,
        )),
        6 => Ok((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => Err(invalid()),
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (r, g, b) = parse_hex_rgb(s)?;
        Ok(Self { r, g, b })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A stock paint offered in the paint picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintSwatch {
    pub id: u32,
    pub name: &'static str,
    pub color: Color,
}

/// The stock paint palette, in picker order.
pub const PAINT_SWATCHES: [PaintSwatch; 6] = [
    PaintSwatch { id: 1, name: "Classic White", color: Color::from_u32(0xFF_FFFF) },
    PaintSwatch { id: 2, name: "Warm Beige", color: Color::from_u32(0xE8_DCC4) },
    PaintSwatch { id: 3, name: "Soft Gray", color: Color::from_u32(0xD3_D3D3) },
    PaintSwatch { id: 4, name: "Sky Blue", color: Color::from_u32(0x87_CEEB) },
    PaintSwatch { id: 5, name: "Sage Green", color: Color::from_u32(0x9D_C183) },
    PaintSwatch { id: 6, name: "Blush Pink", color: Color::from_u32(0xFF_B6C1) },
];

/// Look up a stock swatch by id.
#[must_use]
pub fn swatch(id: u32) -> Option<&'static PaintSwatch> {
    PAINT_SWATCHES.iter().find(|s| s.id == id)
}
