//! Color spaces and the closed color variant.

use std::collections::HashMap;
use std::sync::LazyLock;

use smol_str::SmolStr;

use crate::error::{RenderError, Result};

/// A resolved RGB triple, each channel in [0, 1].
pub type Rgb = (f64, f64, f64);

/// A named color space with a known component count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSpace {
    pub name: SmolStr,
    pub ncomponents: usize,
}

impl ColorSpace {
    pub fn new(name: &str, ncomponents: usize) -> Self {
        Self {
            name: SmolStr::new(name),
            ncomponents,
        }
    }

    /// Initial color of this space (black in every device space).
    pub fn initial_color(&self) -> Color {
        match self.ncomponents {
            3 => Color::Rgb(0.0, 0.0, 0.0),
            4 => Color::Cmyk(0.0, 0.0, 0.0, 1.0),
            _ => Color::Gray(0.0),
        }
    }
}

/// Predefined color spaces, keyed by PDF name.
pub static PREDEFINED_COLORSPACE: LazyLock<HashMap<&'static str, ColorSpace>> =
    LazyLock::new(|| {
        let entries = [
            ("DeviceGray", 1),
            ("CalGray", 1),
            ("DeviceRGB", 3),
            ("CalRGB", 3),
            ("Lab", 3),
            ("DeviceCMYK", 4),
            ("Indexed", 1),
            ("Pattern", 1),
        ];
        let mut map = HashMap::with_capacity(entries.len());
        for (name, n) in entries {
            map.insert(name, ColorSpace::new(name, n));
        }
        map
    });

/// The default (DeviceGray) color space.
pub fn device_gray() -> ColorSpace {
    ColorSpace::new("DeviceGray", 1)
}

/// A color value in one of the closed set of variants.
///
/// Every variant knows how to reduce itself to RGB or fail with a
/// typed error; there is no dynamic colorspace dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Color {
    /// Greyscale (0.0 = black, 1.0 = white).
    Gray(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
    /// Palette index; the palette itself lives upstream, so this is
    /// not reducible here.
    Indexed(u32),
    /// Tiling/shading pattern reference, not reducible to a flat RGB.
    Pattern(SmolStr),
}

impl Default for Color {
    fn default() -> Self {
        Color::Gray(0.0)
    }
}

impl Color {
    /// Reduces the color to an RGB triple.
    ///
    /// `Indexed` and `Pattern` have no flat RGB equivalent and return
    /// [`RenderError::ColorConversion`].
    pub fn to_rgb(&self) -> Result<Rgb> {
        match *self {
            Color::Gray(g) => {
                let g = clamp_unit(g);
                Ok((g, g, g))
            }
            Color::Rgb(r, g, b) => Ok((clamp_unit(r), clamp_unit(g), clamp_unit(b))),
            Color::Cmyk(c, m, y, k) => {
                let (c, m, y, k) = (clamp_unit(c), clamp_unit(m), clamp_unit(y), clamp_unit(k));
                Ok(((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)))
            }
            Color::Indexed(_) => Err(RenderError::ColorConversion("Indexed")),
            Color::Pattern(_) => Err(RenderError::ColorConversion("Pattern")),
        }
    }
}

#[inline]
fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}
