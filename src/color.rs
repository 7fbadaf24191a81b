use crate::config::ColorMode;
use crate::mapping::constrain;
use crate::signal::BandEnergy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const MONO: Self = Self::new(226, 232, 240);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Rec. 601 luma, 0..=255.
    pub fn luma(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }

    pub fn scaled(self, k: f32) -> Self {
        let k = constrain(k, 0.0, 1.0);
        Self::new(
            (self.r as f32 * k).round() as u8,
            (self.g as f32 * k).round() as u8,
            (self.b as f32 * k).round() as u8,
        )
    }
}

pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(1.0) * 6.0;
    let s = constrain(s, 0.0, 1.0);
    let v = constrain(v, 0.0, 1.0);
    let i = h.floor();
    let f = h - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match i as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb::new(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

/// Per-cell features every render mode hands to the color and size functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSample {
    /// 0..=255.
    pub brightness: f32,
    /// The sample's own color (source pixel, ring tint, ...).
    pub rgb: Rgb,
    /// 0..1, wraps.
    pub hue: f32,
}

impl CellSample {
    pub fn gray(brightness: f32) -> Self {
        let v = constrain(brightness, 0.0, 255.0).round() as u8;
        Self {
            brightness,
            rgb: Rgb::new(v, v, v),
            hue: 0.0,
        }
    }
}

/// Fraction of each band's smoothed energy added to the matching channel in energy mode.
pub const ENERGY_BOOST: f32 = 0.5;

pub fn cell_color(mode: ColorMode, sample: &CellSample, energy: &BandEnergy, t: f32) -> Rgb {
    match mode {
        ColorMode::Mono => Rgb::MONO,
        ColorMode::Color => sample.rgb,
        ColorMode::Hue => {
            let v = 0.25 + 0.75 * constrain(sample.brightness / 255.0, 0.0, 1.0);
            hsv_to_rgb(sample.hue + t * 0.03, 0.85, v)
        }
        ColorMode::Energy => {
            let boost = |c: u8, band: f32| -> u8 {
                constrain(c as f32 + band * ENERGY_BOOST, 0.0, 255.0).round() as u8
            };
            Rgb::new(
                boost(sample.rgb.r, energy.bass.smoothed),
                boost(sample.rgb.g, energy.mid.smoothed),
                boost(sample.rgb.b, energy.treble.smoothed),
            )
        }
    }
}
