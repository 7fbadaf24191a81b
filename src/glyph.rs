use crate::config::Density;
use crate::mapping::{constrain, map_range};

pub const FALLBACK_GLYPH: char = ' ';

// Densest first. Every ramp ends in a space so silence reads as empty canvas.
const RAMP_LOW: &str = "@%#*+=-:. ";
const RAMP_MEDIUM: &str = "@&B%#W8M*oahkpq+=~-:,. ";
const RAMP_HIGH: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Ordered glyph ramp, densest character first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    /// `None` for an empty ramp.
    pub fn new(ramp: &str) -> Option<Self> {
        let glyphs = ramp.chars().filter(|c| !c.is_control()).collect::<Vec<_>>();
        if glyphs.is_empty() {
            return None;
        }
        Some(Self { glyphs })
    }

    pub fn for_density(density: Density) -> Self {
        let ramp = match density {
            Density::Low => RAMP_LOW,
            Density::Medium => RAMP_MEDIUM,
            Density::High => RAMP_HIGH,
        };
        Self {
            glyphs: ramp.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn glyph(&self, idx: usize) -> Option<char> {
        self.glyphs.get(idx).copied()
    }

    pub fn densest(&self) -> char {
        self.glyphs.first().copied().unwrap_or(FALLBACK_GLYPH)
    }

    pub fn sparsest(&self) -> char {
        self.glyphs.last().copied().unwrap_or(FALLBACK_GLYPH)
    }

    pub fn as_string(&self) -> String {
        self.glyphs.iter().collect()
    }
}

/// Brightness in [0, 255] → glyph. 0 picks the sparsest (last) glyph, 255 the densest.
///
/// Out-of-range brightness is clamped first; NaN falls back to a space.
pub fn select_glyph(brightness: f32, palette: &Palette) -> char {
    if brightness.is_nan() || palette.is_empty() {
        return FALLBACK_GLYPH;
    }
    let last = (palette.len() - 1) as f32;
    let b = constrain(brightness, 0.0, 255.0);
    let idx = map_range(b, 0.0, 255.0, last, 0.0).floor();
    if !(0.0..=last).contains(&idx) {
        return FALLBACK_GLYPH;
    }
    palette.glyph(idx as usize).unwrap_or(FALLBACK_GLYPH)
}
