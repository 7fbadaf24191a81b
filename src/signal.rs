//! Band energy extraction from analysis frames.

use crate::analysis::{AnalysisFrame, AnalysisSource};
use crate::mapping::{constrain, lerp, map_range};

pub const ENERGY_MAX: f32 = 255.0;
pub const VOLUME_FLOOR_DB: f32 = -60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Bass,
    Mid,
    Treble,
    Volume,
}

impl Band {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bass" | "low" => Some(Self::Bass),
            "mid" | "mids" => Some(Self::Mid),
            "treble" | "treb" | "high" => Some(Self::Treble),
            "volume" | "vol" | "rms" => Some(Self::Volume),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bass => "bass",
            Self::Mid => "mid",
            Self::Treble => "treble",
            Self::Volume => "volume",
        }
    }
}

/// Average linear magnitude of the bins covering `[min_hz, max_hz]`, scaled by
/// `multiplier` and clamped to `[0, 255]`.
///
/// Bin indices are `floor(hz / nyquist * bins)`; the upper index is clamped to the last
/// bin. An empty or inverted band yields 0.
pub fn frequency_energy(
    spectrum_db: &[f32],
    min_hz: f32,
    max_hz: f32,
    nyquist_hz: f32,
    multiplier: f32,
) -> f32 {
    let bins = spectrum_db.len();
    if bins == 0 || !(nyquist_hz > 0.0) {
        return 0.0;
    }

    let low = (min_hz / nyquist_hz * bins as f32).floor();
    let high = (max_hz / nyquist_hz * bins as f32).floor();
    if !low.is_finite() || !high.is_finite() || high < low {
        return 0.0;
    }
    let low = low.max(0.0) as usize;
    let high = (high.max(0.0) as usize).min(bins - 1);
    if low >= bins || high < low {
        return 0.0;
    }

    let band = &spectrum_db[low..=high];
    let sum = band.iter().map(|db| 10f32.powf(db / 20.0)).sum::<f32>();
    let avg = sum / band.len() as f32;
    constrain(avg * multiplier, 0.0, ENERGY_MAX)
}

/// Meter reading in dBFS → [0, 1], with everything at or below -60 dB as silence.
pub fn volume_from_db(db: f32) -> f32 {
    let db = constrain(db, VOLUME_FLOOR_DB, 0.0);
    map_range(db, VOLUME_FLOOR_DB, 0.0, 0.0, 1.0)
}

/// Mean absolute amplitude over the buffer; 0 when empty.
pub fn mean_abs_amplitude(waveform: &[f32]) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }
    waveform.iter().map(|s| s.abs()).sum::<f32>() / waveform.len() as f32
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Smoothed {
    pub raw: f32,
    pub smoothed: f32,
}

impl Smoothed {
    pub fn update(&mut self, raw: f32, factor: f32) {
        self.raw = raw;
        self.smoothed = lerp(self.smoothed, raw, factor);
    }
}

/// Bass/mid/treble in [0, 255], volume in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BandEnergy {
    pub bass: Smoothed,
    pub mid: Smoothed,
    pub treble: Smoothed,
    pub volume: Smoothed,
}

impl BandEnergy {
    pub fn get(&self, band: Band) -> Smoothed {
        match band {
            Band::Bass => self.bass,
            Band::Mid => self.mid,
            Band::Treble => self.treble,
            Band::Volume => self.volume,
        }
    }

    /// Smoothed value rescaled to [0, 1] regardless of the band's native unit.
    pub fn level(&self, band: Band) -> f32 {
        let v = self.get(band).smoothed;
        match band {
            Band::Volume => constrain(v, 0.0, 1.0),
            _ => constrain(v / ENERGY_MAX, 0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFactors {
    pub bass: f32,
    pub mid: f32,
    pub treble: f32,
    pub volume: f32,
}

impl Default for SmoothingFactors {
    fn default() -> Self {
        Self {
            bass: 0.3,
            mid: 0.3,
            treble: 0.3,
            volume: 0.2,
        }
    }
}

impl SmoothingFactors {
    pub fn get_mut(&mut self, band: Band) -> &mut f32 {
        match band {
            Band::Bass => &mut self.bass,
            Band::Mid => &mut self.mid,
            Band::Treble => &mut self.treble,
            Band::Volume => &mut self.volume,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandRange {
    pub min_hz: f32,
    pub max_hz: f32,
    pub multiplier: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTuning {
    pub bass: BandRange,
    pub mid: BandRange,
    pub treble: BandRange,
}

impl Default for BandTuning {
    fn default() -> Self {
        Self {
            bass: BandRange {
                min_hz: 20.0,
                max_hz: 250.0,
                multiplier: 800.0,
            },
            mid: BandRange {
                min_hz: 250.0,
                max_hz: 2_000.0,
                multiplier: 1_200.0,
            },
            treble: BandRange {
                min_hz: 2_000.0,
                max_hz: 16_000.0,
                multiplier: 2_000.0,
            },
        }
    }
}

impl BandTuning {
    /// `None` for [`Band::Volume`], which comes from the meter rather than the spectrum.
    pub fn get_mut(&mut self, band: Band) -> Option<&mut BandRange> {
        match band {
            Band::Bass => Some(&mut self.bass),
            Band::Mid => Some(&mut self.mid),
            Band::Treble => Some(&mut self.treble),
            Band::Volume => None,
        }
    }
}

/// Long-lived band energy state, updated once per frame.
///
/// Reads never fail: without a source, or before the source has produced anything,
/// the last known values stay in place.
#[derive(Debug, Clone, Default)]
pub struct AudioReactiveState {
    energy: BandEnergy,
    pub factors: SmoothingFactors,
    pub tuning: BandTuning,
    frame: AnalysisFrame,
    has_frame: bool,
}

impl AudioReactiveState {
    pub fn new(factors: SmoothingFactors, tuning: BandTuning) -> Self {
        Self {
            factors,
            tuning,
            ..Self::default()
        }
    }

    /// Pulls one snapshot from `source`. Returns `true` when fresh data was consumed.
    pub fn update(&mut self, source: &mut dyn AnalysisSource) -> bool {
        if !source.read(&mut self.frame) {
            return false;
        }
        self.has_frame = true;
        self.advance();
        true
    }

    /// Feeds a frame directly, bypassing any source.
    pub fn update_from_frame(&mut self, frame: &AnalysisFrame) {
        self.frame.clone_from(frame);
        self.has_frame = true;
        self.advance();
    }

    fn advance(&mut self) {
        let f = &self.frame;
        let t = self.tuning;
        let bass = frequency_energy(
            &f.spectrum_db,
            t.bass.min_hz,
            t.bass.max_hz,
            f.nyquist_hz,
            t.bass.multiplier,
        );
        let mid = frequency_energy(
            &f.spectrum_db,
            t.mid.min_hz,
            t.mid.max_hz,
            f.nyquist_hz,
            t.mid.multiplier,
        );
        let treble = frequency_energy(
            &f.spectrum_db,
            t.treble.min_hz,
            t.treble.max_hz,
            f.nyquist_hz,
            t.treble.multiplier,
        );
        let volume = volume_from_db(f.meter_db);

        let k = self.factors;
        self.energy.bass.update(bass, k.bass);
        self.energy.mid.update(mid, k.mid);
        self.energy.treble.update(treble, k.treble);
        self.energy.volume.update(volume, k.volume);
    }

    pub fn energy(&self) -> &BandEnergy {
        &self.energy
    }

    /// Last consumed frame, if any source has ever delivered one.
    pub fn frame(&self) -> Option<&AnalysisFrame> {
        self.has_frame.then_some(&self.frame)
    }

    pub fn reset(&mut self) {
        self.energy = BandEnergy::default();
        self.frame = AnalysisFrame::default();
        self.has_frame = false;
    }
}
