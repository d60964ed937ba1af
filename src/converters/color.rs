//! Device color to CSS `rgb()` conversion.
//!
//! Shared by the attribute cascade (Layout colors) and the vector emitter
//! (fill/stroke state). Components are in the 0.0-1.0 range.

use std::fmt;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Black, the initial fill and stroke color.
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// DeviceRGB components.
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    /// DeviceGray level.
    pub fn from_gray(gray: f32) -> Self {
        let v = channel(gray);
        Self { r: v, g: v, b: v }
    }

    /// DeviceCMYK components, `255 * (1 - c) * (1 - k)` per channel.
    pub fn from_cmyk(c: f32, m: f32, y: f32, k: f32) -> Self {
        let k = 1.0 - k.clamp(0.0, 1.0);
        Self {
            r: channel((1.0 - c.clamp(0.0, 1.0)) * k),
            g: channel((1.0 - m.clamp(0.0, 1.0)) * k),
            b: channel((1.0 - y.clamp(0.0, 1.0)) * k),
        }
    }

    /// Interpret a component array by its length: 1 gray, 3 RGB, 4 CMYK.
    pub fn from_components(components: &[f32]) -> Option<Self> {
        match *components {
            [gray] => Some(Self::from_gray(gray)),
            [r, g, b] => Some(Self::from_rgb(r, g, b)),
            [c, m, y, k] => Some(Self::from_cmyk(c, m, y, k)),
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

fn channel(v: f32) -> u8 {
    if !v.is_finite() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
