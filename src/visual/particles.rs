use crate::color::{CellSample, cell_color, hsv_to_rgb};
use crate::config::RenderMode;
use crate::glyph::select_glyph;
use crate::mapping::{constrain, lerp};
use crate::surface::Surface;
use crate::visual::modes::wave_at;
use crate::visual::{ModeCtx, RenderStrategy};

pub const DEFAULT_COUNT: usize = 240;
pub const DAMPING: f32 = 0.99;
pub const JITTER: f32 = 2.5;
const BASE_SIZE: f32 = 6.0;
const SIZE_GAIN: f32 = 14.0;
/// Particles at least this large get a filled halo behind their glyph.
pub const HALO_SIZE: f32 = 14.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
    pub alpha: f32,
}

/// Fixed-size particle pool. Particles never die; they wrap at the canvas edges.
pub struct ParticlePool {
    particles: Vec<Particle>,
    rng: fastrand::Rng,
    width: f32,
    height: f32,
    pub damping: f32,
    pub jitter: f32,
}

impl ParticlePool {
    pub fn new(count: usize, width: f32, height: f32, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let width = width.max(1.0);
        let height = height.max(1.0);
        let particles = (0..count)
            .map(|_| Particle {
                x: rng.f32() * width,
                y: rng.f32() * height,
                vx: rng.f32() * 2.0 - 1.0,
                vy: rng.f32() * 2.0 - 1.0,
                size: BASE_SIZE,
                alpha: 0.5 + rng.f32() * 0.5,
            })
            .collect();
        Self {
            particles,
            rng,
            width,
            height,
            damping: DAMPING,
            jitter: JITTER,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Rescales positions into the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        let width = width.max(1.0);
        let height = height.max(1.0);
        if width == self.width && height == self.height {
            return;
        }
        let sx = width / self.width;
        let sy = height / self.height;
        for p in &mut self.particles {
            p.x = wrap(p.x * sx, width);
            p.y = wrap(p.y * sy, height);
        }
        self.width = width;
        self.height = height;
    }

    /// One tick. `amplitude_at` gets the particle's normalized x and returns the local
    /// amplitude in [0, 1].
    pub fn step(&mut self, amplitude_at: impl Fn(f32) -> f32) {
        for p in &mut self.particles {
            let amp = constrain(amplitude_at(p.x / self.width), 0.0, 1.0);
            p.vx += (self.rng.f32() * 2.0 - 1.0) * self.jitter * amp;
            p.vy += (self.rng.f32() * 2.0 - 1.0) * self.jitter * amp;
            p.vx *= self.damping;
            p.vy *= self.damping;
            p.x = wrap(p.x + p.vx, self.width);
            p.y = wrap(p.y + p.vy, self.height);
            p.size = BASE_SIZE + amp * SIZE_GAIN;
            p.alpha = lerp(p.alpha, 0.25 + 0.75 * amp, 0.2);
        }
    }
}

fn wrap(v: f32, max: f32) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }
    let w = v.rem_euclid(max);
    // rem_euclid can round up to `max` for tiny negative inputs.
    if w >= max { 0.0 } else { w }
}

pub struct ParticleMode {
    pool: ParticlePool,
}

impl ParticleMode {
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self {
            pool: ParticlePool::new(DEFAULT_COUNT, width, height, seed),
        }
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }
}

impl RenderStrategy for ParticleMode {
    fn mode(&self) -> RenderMode {
        RenderMode::Particles
    }

    fn on_resize(&mut self, w: f32, h: f32) {
        self.pool.resize(w, h);
    }

    fn draw(&mut self, ctx: &ModeCtx<'_>, surface: &mut dyn Surface) -> usize {
        let wave = ctx.frame.waveform.as_slice();
        self.pool.step(|nx| wave_at(wave, nx, 1.0).abs());

        let (w, _) = self.pool.bounds();
        // Halos first so no fill covers another particle's glyph.
        for p in self.pool.particles().iter().filter(|p| p.size >= HALO_SIZE) {
            let hue = p.x / w;
            let halo = hsv_to_rgb(hue, 0.65, p.alpha).scaled(0.3);
            surface.fill_circle(p.x, p.y, p.size * 0.6, halo);
        }
        for p in self.pool.particles() {
            let brightness = constrain(p.alpha * 255.0, 0.0, 255.0);
            let hue = p.x / w;
            let sample = CellSample {
                brightness,
                rgb: hsv_to_rgb(hue, 0.65, p.alpha),
                hue,
            };
            let ch = select_glyph(brightness, ctx.palette);
            let color = cell_color(ctx.color_mode, &sample, ctx.energy, ctx.t);
            surface.glyph(p.x, p.y, p.size, ch, color);
        }
        self.pool.particles().len()
    }
}
