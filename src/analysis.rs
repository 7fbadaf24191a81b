use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::{PI, TAU};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering, fence};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const FFT_SIZE: usize = 2048;
pub const SPECTRUM_BINS: usize = FFT_SIZE / 2;
pub const WAVEFORM_LEN: usize = 1024;
pub const MIN_DB: f32 = -100.0;

/// One snapshot of analysis data for a single render tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFrame {
    /// Time-domain samples in [-1, 1], oldest first.
    pub waveform: Vec<f32>,
    /// Per-bin magnitude in dB, floored at [`MIN_DB`].
    pub spectrum_db: Vec<f32>,
    /// RMS level in dBFS, floored at [`MIN_DB`].
    pub meter_db: f32,
    pub nyquist_hz: f32,
}

impl AnalysisFrame {
    pub fn silent(nyquist_hz: f32) -> Self {
        Self {
            waveform: vec![0.0; WAVEFORM_LEN],
            spectrum_db: vec![MIN_DB; SPECTRUM_BINS],
            meter_db: MIN_DB,
            nyquist_hz,
        }
    }
}

impl Default for AnalysisFrame {
    fn default() -> Self {
        Self::silent(24_000.0)
    }
}

/// Anything that can hand the visualizer a fresh analysis snapshot once per frame.
pub trait AnalysisSource {
    fn name(&self) -> &'static str;

    /// Copies the latest snapshot into `frame`. Returns `false` while nothing has been
    /// analysed yet, in which case `frame` is left untouched.
    fn read(&mut self, frame: &mut AnalysisFrame) -> bool;

    /// Milliseconds since the newest snapshot, for sources that analyse on their own thread.
    fn age_ms(&self) -> Option<f32> {
        None
    }
}

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    fft_buf: Vec<Complex<f32>>,
    smoothed_mags: Vec<f32>,
    smoothing: f32,
    sample_rate_hz: u32,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate_hz: u32) -> Self {
        let n = FFT_SIZE;
        let window = (0..n)
            .map(|i| 0.5 - 0.5 * ((2.0 * PI * i as f32) / (n as f32)).cos())
            .collect::<Vec<_>>();
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(n),
            window,
            fft_buf: vec![Complex { re: 0.0, im: 0.0 }; n],
            smoothed_mags: vec![0.0; SPECTRUM_BINS],
            smoothing: 0.8,
            sample_rate_hz: sample_rate_hz.max(1),
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn nyquist_hz(&self) -> f32 {
        self.sample_rate_hz as f32 * 0.5
    }

    /// Per-bin temporal smoothing in [0, 1); 0 disables it.
    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.smoothing = smoothing.clamp(0.0, 0.99);
    }

    /// Analyses the `FFT_SIZE` samples of `ring`, reading from `write_pos` (the oldest
    /// sample) onwards and wrapping around.
    pub fn analyze(&mut self, ring: &[f32], write_pos: usize, frame: &mut AnalysisFrame) {
        let n = FFT_SIZE;
        if ring.len() != n {
            return;
        }

        frame.waveform.resize(WAVEFORM_LEN, 0.0);
        frame.spectrum_db.resize(SPECTRUM_BINS, MIN_DB);

        let wave_start = n - WAVEFORM_LEN;
        let mut rms_acc = 0.0f32;
        for i in 0..n {
            let s = ring[(write_pos + i) % n];
            self.fft_buf[i].re = s * self.window[i];
            self.fft_buf[i].im = 0.0;
            if i >= wave_start {
                frame.waveform[i - wave_start] = s;
                rms_acc += s * s;
            }
        }
        let rms = (rms_acc / WAVEFORM_LEN as f32).sqrt();
        frame.meter_db = to_db(rms);

        self.fft.process(&mut self.fft_buf);
        let k = self.smoothing;
        for (i, c) in self.fft_buf.iter().take(SPECTRUM_BINS).enumerate() {
            let mag = (c.re * c.re + c.im * c.im).sqrt() / n as f32;
            let s = k * self.smoothed_mags[i] + (1.0 - k) * mag;
            self.smoothed_mags[i] = s;
            frame.spectrum_db[i] = to_db(s);
        }
        frame.nyquist_hz = self.nyquist_hz();
    }
}

fn to_db(linear: f32) -> f32 {
    let db = 20.0 * linear.log10();
    if db.is_nan() { MIN_DB } else { db.max(MIN_DB) }
}

/// Lock-free single-writer snapshot cell for analysis frames.
///
/// The writer bumps `seq` to odd before touching the payload and back to even after;
/// readers retry until they observe the same even value on both sides of their copy.
pub struct SharedAnalysis {
    seq: AtomicU64,
    waveform: Box<[AtomicU32]>,
    spectrum_db: Box<[AtomicU32]>,
    meter_db: AtomicU32,
    nyquist_hz: AtomicU32,
    updated_ms: AtomicU64,
}

impl SharedAnalysis {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            waveform: (0..WAVEFORM_LEN).map(|_| AtomicU32::new(0)).collect(),
            spectrum_db: (0..SPECTRUM_BINS)
                .map(|_| AtomicU32::new(MIN_DB.to_bits()))
                .collect(),
            meter_db: AtomicU32::new(MIN_DB.to_bits()),
            nyquist_hz: AtomicU32::new(0),
            updated_ms: AtomicU64::new(0),
        }
    }

    pub fn store(&self, frame: &AnalysisFrame) {
        self.seq.fetch_add(1, Ordering::Relaxed);
        // Payload stores must not become visible before the odd sequence number.
        fence(Ordering::Release);
        for (dst, src) in self.waveform.iter().zip(&frame.waveform) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        for (dst, src) in self.spectrum_db.iter().zip(&frame.spectrum_db) {
            dst.store(src.to_bits(), Ordering::Relaxed);
        }
        self.meter_db.store(frame.meter_db.to_bits(), Ordering::Relaxed);
        self.nyquist_hz
            .store(frame.nyquist_hz.to_bits(), Ordering::Relaxed);
        self.updated_ms.store(now_ms().max(1), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release);
    }

    pub fn load_into(&self, frame: &mut AnalysisFrame) -> bool {
        if self.updated_ms.load(Ordering::Relaxed) == 0 {
            return false;
        }
        frame.waveform.resize(WAVEFORM_LEN, 0.0);
        frame.spectrum_db.resize(SPECTRUM_BINS, MIN_DB);

        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                std::hint::spin_loop();
                continue;
            }

            for (dst, src) in frame.waveform.iter_mut().zip(self.waveform.iter()) {
                *dst = f32::from_bits(src.load(Ordering::Relaxed));
            }
            for (dst, src) in frame.spectrum_db.iter_mut().zip(self.spectrum_db.iter()) {
                *dst = f32::from_bits(src.load(Ordering::Relaxed));
            }
            frame.meter_db = f32::from_bits(self.meter_db.load(Ordering::Relaxed));
            frame.nyquist_hz = f32::from_bits(self.nyquist_hz.load(Ordering::Relaxed));

            // Keeps the payload loads above the second sequence read.
            fence(Ordering::Acquire);
            let v2 = self.seq.load(Ordering::Relaxed);
            if v1 == v2 {
                return true;
            }
        }
    }

    /// `None` until the first `store`.
    pub fn age_ms(&self) -> Option<f32> {
        let t = self.updated_ms.load(Ordering::Relaxed);
        (t != 0).then(|| now_ms().saturating_sub(t) as f32)
    }
}

impl Default for SharedAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_millis(0))
        .as_millis() as u64
}

const BEAT_SECONDS: f32 = 0.5;

/// Deterministic 120 BPM kick / hi-hat / pad loop, analysed in-process.
///
/// Each `read` advances the clock by `sample_rate / fps` samples, so two sources built
/// with the same arguments produce identical frame sequences.
pub struct SynthSource {
    analyzer: SpectrumAnalyzer,
    ring: Vec<f32>,
    write_pos: usize,
    hop: usize,
    clock: u64,
    kick_phase: f32,
    rng: fastrand::Rng,
}

impl SynthSource {
    pub fn new(sample_rate_hz: u32, fps: u32, seed: u64) -> Self {
        let sample_rate_hz = sample_rate_hz.max(8_000);
        let hop = (sample_rate_hz / fps.max(1)).max(1) as usize;
        Self {
            analyzer: SpectrumAnalyzer::new(sample_rate_hz),
            ring: vec![0.0; FFT_SIZE],
            write_pos: 0,
            hop,
            clock: 0,
            kick_phase: 0.0,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.clock as f32 / self.analyzer.sample_rate_hz() as f32
    }

    fn next_sample(&mut self) -> f32 {
        let sr = self.analyzer.sample_rate_hz() as f32;
        let t = self.clock as f32 / sr;
        self.clock += 1;

        let tb = t % BEAT_SECONDS;
        if tb < 1.0 / sr {
            self.kick_phase = 0.0;
        }
        // Pitch-swept sine, 130 Hz falling to 50 Hz.
        let kick_hz = 50.0 + 80.0 * (-tb * 30.0).exp();
        self.kick_phase = (self.kick_phase + TAU * kick_hz / sr) % TAU;
        let kick = self.kick_phase.sin() * (-tb * 8.0).exp() * 0.9;

        let th = (t + BEAT_SECONDS * 0.5) % BEAT_SECONDS;
        let hat = (self.rng.f32() * 2.0 - 1.0) * (-th * 60.0).exp() * 0.25;

        let swell = 0.5 + 0.5 * (TAU * 0.25 * t).sin();
        let pad = [220.0f32, 277.18, 329.63]
            .iter()
            .map(|f| (TAU * f * t).sin())
            .sum::<f32>()
            / 3.0
            * 0.12
            * swell;

        (kick + hat + pad).clamp(-1.0, 1.0)
    }
}

impl AnalysisSource for SynthSource {
    fn name(&self) -> &'static str {
        "synth"
    }

    fn read(&mut self, frame: &mut AnalysisFrame) -> bool {
        for _ in 0..self.hop {
            let s = self.next_sample();
            self.ring[self.write_pos] = s;
            self.write_pos = (self.write_pos + 1) % FFT_SIZE;
        }
        self.analyzer.analyze(&self.ring, self.write_pos, frame);
        true
    }
}
