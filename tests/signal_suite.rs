use ascii_reactor::analysis::{AnalysisFrame, AnalysisSource, SPECTRUM_BINS};
use ascii_reactor::signal::{
    AudioReactiveState, Band, BandTuning, Smoothed, SmoothingFactors, frequency_energy,
    mean_abs_amplitude, volume_from_db,
};

/// Every bin at the same level, 48 kHz sample rate.
fn flat_frame(db: f32, meter_db: f32) -> AnalysisFrame {
    let mut f = AnalysisFrame::silent(24_000.0);
    f.spectrum_db = vec![db; SPECTRUM_BINS];
    f.meter_db = meter_db;
    f
}

/// Hands out a fixed sequence of reads; `None` means "nothing new".
struct Scripted {
    reads: Vec<Option<AnalysisFrame>>,
}

impl AnalysisSource for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn read(&mut self, frame: &mut AnalysisFrame) -> bool {
        if self.reads.is_empty() {
            return false;
        }
        match self.reads.remove(0) {
            Some(f) => {
                *frame = f;
                true
            }
            None => false,
        }
    }
}

// ── band extraction ─────────────────────────────────────────────────────────

#[test]
fn minus_sixty_db_times_800_is_point_eight() {
    let spectrum = vec![-60.0; SPECTRUM_BINS];
    let e = frequency_energy(&spectrum, 20.0, 250.0, 24_000.0, 800.0);
    assert!((e - 0.8).abs() < 1e-3, "got {e}");
}

#[test]
fn energy_grows_with_multiplier() {
    let spectrum = (0..SPECTRUM_BINS)
        .map(|i| -90.0 + (i % 7) as f32 * 5.0)
        .collect::<Vec<_>>();
    let mut last = 0.0;
    for m in [0.0, 100.0, 400.0, 800.0, 1_600.0, 1.0e6] {
        let e = frequency_energy(&spectrum, 250.0, 2_000.0, 24_000.0, m);
        assert!(e >= last, "multiplier {m} gave {e} < {last}");
        last = e;
    }
    assert_eq!(last, 255.0);
}

#[test]
fn degenerate_bands_are_silent() {
    let spectrum = vec![0.0; SPECTRUM_BINS];
    // Inverted.
    assert_eq!(frequency_energy(&spectrum, 2_000.0, 250.0, 24_000.0, 800.0), 0.0);
    // Entirely above Nyquist.
    assert_eq!(frequency_energy(&spectrum, 30_000.0, 40_000.0, 24_000.0, 800.0), 0.0);
    assert_eq!(frequency_energy(&[], 20.0, 250.0, 24_000.0, 800.0), 0.0);
    assert_eq!(frequency_energy(&spectrum, 20.0, 250.0, 0.0, 800.0), 0.0);
}

#[test]
fn band_top_is_clamped_to_last_bin() {
    let spectrum = vec![-60.0; SPECTRUM_BINS];
    let e = frequency_energy(&spectrum, 16_000.0, 90_000.0, 24_000.0, 1_000.0);
    assert!((e - 1.0).abs() < 1e-3, "got {e}");
}

#[test]
fn volume_maps_meter_onto_unit_range() {
    assert_eq!(volume_from_db(-100.0), 0.0);
    assert_eq!(volume_from_db(-60.0), 0.0);
    assert!((volume_from_db(-30.0) - 0.5).abs() < 1e-6);
    assert_eq!(volume_from_db(0.0), 1.0);
    assert_eq!(volume_from_db(6.0), 1.0);
}

#[test]
fn mean_abs_amplitude_ignores_sign() {
    assert_eq!(mean_abs_amplitude(&[]), 0.0);
    assert!((mean_abs_amplitude(&[0.5, -0.5, 1.0, -1.0]) - 0.75).abs() < 1e-6);
}

#[test]
fn band_names_parse() {
    assert_eq!(Band::parse("bass"), Some(Band::Bass));
    assert_eq!(Band::parse(" Mid "), Some(Band::Mid));
    assert_eq!(Band::parse("treble"), Some(Band::Treble));
    assert_eq!(Band::parse("vol"), Some(Band::Volume));
    assert_eq!(Band::parse("sub"), None);
}

// ── smoothing ───────────────────────────────────────────────────────────────

#[test]
fn one_smoothing_step_from_zero_to_hundred() {
    let mut s = Smoothed::default();
    s.update(100.0, 0.3);
    assert_eq!(s.raw, 100.0);
    assert!((s.smoothed - 30.0).abs() < 1e-4);
}

#[test]
fn smoothing_converges_to_steady_input() {
    let mut s = Smoothed::default();
    for _ in 0..100 {
        s.update(100.0, 0.3);
    }
    assert!((s.smoothed - 100.0).abs() < 1e-3);

    // Factor 1 jumps straight to the input.
    s.update(7.0, 1.0);
    assert_eq!(s.smoothed, 7.0);
}

// ── reactive state ──────────────────────────────────────────────────────────

#[test]
fn update_from_frame_smooths_every_band() {
    let mut state = AudioReactiveState::new(SmoothingFactors::default(), BandTuning::default());
    state.update_from_frame(&flat_frame(-60.0, -30.0));

    let e = state.energy();
    assert!((e.bass.raw - 0.8).abs() < 1e-3);
    assert!((e.bass.smoothed - 0.24).abs() < 1e-3);
    assert!((e.mid.raw - 1.2).abs() < 1e-3);
    assert!((e.treble.raw - 2.0).abs() < 1e-3);
    assert!((e.volume.raw - 0.5).abs() < 1e-6);
    assert!((e.volume.smoothed - 0.1).abs() < 1e-6);
}

#[test]
fn failed_reads_keep_last_values() {
    let mut state = AudioReactiveState::default();
    assert!(state.frame().is_none());

    let mut src = Scripted {
        reads: vec![Some(flat_frame(-20.0, -10.0)), None, None],
    };
    assert!(state.update(&mut src));
    let after_first = *state.energy();
    assert!(after_first.bass.smoothed > 0.0);

    assert!(!state.update(&mut src));
    assert!(!state.update(&mut src));
    // Exhausted source.
    assert!(!state.update(&mut src));
    assert_eq!(*state.energy(), after_first);
    assert!(state.frame().is_some());
}

#[test]
fn tuning_changes_take_effect_next_update() {
    let mut state = AudioReactiveState::default();
    state.tuning.bass.multiplier = 1_600.0;
    state.factors.bass = 1.0;
    state.update_from_frame(&flat_frame(-60.0, -60.0));
    assert!((state.energy().bass.smoothed - 1.6).abs() < 1e-3);
}

#[test]
fn reset_forgets_everything() {
    let mut state = AudioReactiveState::default();
    state.update_from_frame(&flat_frame(-10.0, -5.0));
    state.reset();
    assert!(state.frame().is_none());
    assert_eq!(state.energy().bass.smoothed, 0.0);
    assert_eq!(state.energy().volume.raw, 0.0);
}

#[test]
fn level_normalizes_each_band() {
    let mut state = AudioReactiveState::default();
    state.factors = SmoothingFactors {
        bass: 1.0,
        mid: 1.0,
        treble: 1.0,
        volume: 1.0,
    };
    state.update_from_frame(&flat_frame(0.0, 0.0));
    let e = state.energy();
    assert_eq!(e.level(Band::Bass), 1.0);
    assert_eq!(e.level(Band::Volume), 1.0);
}
