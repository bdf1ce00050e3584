//! Packed color and HSV helpers.

use serde::{Deserialize, Serialize};

/// 8-bit RGBA color. Serialized as a single packed ARGB integer, the
/// encoding preset documents use for color fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const CYAN: Rgba = Rgba::new(0, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_argb(packed: u32) -> Self {
        Self {
            a: (packed >> 24) as u8,
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Same color with a replacement alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl From<u32> for Rgba {
    fn from(packed: u32) -> Self {
        Self::from_argb(packed)
    }
}

impl From<Rgba> for u32 {
    fn from(color: Rgba) -> Self {
        color.to_argb()
    }
}

/// Convert HSV to RGB. Hue is in degrees and wraps; saturation and value
/// are clamped to [0,1].
pub fn hsv_to_rgb(hue_deg: f32, saturation: f32, value: f32) -> Rgba {
    let h = hue_deg.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Rgba::new(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
        255,
    )
}

/// Per-bar rainbow color: hue sweeps red (quiet) to violet (loud) across
/// the first 300 degrees of the wheel.
pub fn rainbow_for_level(level: f32) -> Rgba {
    hsv_to_rgb(level.clamp(0.0, 1.0) * 300.0, 1.0, 1.0)
}
