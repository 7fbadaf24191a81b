mod modes;
mod particles;

use crate::analysis::{AnalysisFrame, AnalysisSource};
use crate::color::{CellSample, Rgb, hsv_to_rgb};
use crate::config::{ColorMode, Density, RenderConfig, RenderMode};
use crate::glyph::Palette;
use crate::grid::{CellStyle, Grid, SizeMode, render_grid};
use crate::mapping::{constrain, map_range};
use crate::picture::SourceImage;
use crate::signal::{AudioReactiveState, BandEnergy, BandTuning, SmoothingFactors};
use crate::surface::Surface;
use tracing::{debug, info};

pub use modes::{
    CircularMode, GridMode, MESH_COLS, MESH_PHASE_STEP, MESH_ROW_FREQ, MESH_ROWS, MeshMode,
    RINGS, SLOTS_PER_RING, WaveformMode, mesh_displacement,
};
pub use particles::{
    DAMPING, DEFAULT_COUNT, HALO_SIZE, JITTER, Particle, ParticleMode, ParticlePool,
};

/// Everything a render mode may read during one frame.
pub struct ModeCtx<'a> {
    pub t: f32,
    pub dt: f32,
    pub grid: &'a Grid,
    pub frame: &'a AnalysisFrame,
    pub energy: &'a BandEnergy,
    pub palette: &'a Palette,
    pub color_mode: ColorMode,
    pub image: Option<&'a SourceImage>,
}

pub trait RenderStrategy {
    fn mode(&self) -> RenderMode;
    /// Issues this frame's draw calls and returns how many mode elements were drawn.
    fn draw(&mut self, ctx: &ModeCtx<'_>, surface: &mut dyn Surface) -> usize;
    fn on_resize(&mut self, _w: f32, _h: f32) {}
}

pub fn make_strategies(width: f32, height: f32, seed: u64) -> Vec<Box<dyn RenderStrategy>> {
    vec![
        Box::new(GridMode),
        Box::new(WaveformMode),
        Box::new(CircularMode),
        Box::new(ParticleMode::new(width, height, seed)),
        Box::new(MeshMode::new()),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Stopped: nothing was drawn.
    Stopped,
    /// No analysis data: the wall-clock fallback animation ran.
    Idle,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub mode: RenderMode,
    pub state: FrameState,
    pub drawn: usize,
    /// A new snapshot was consumed this frame.
    pub fresh: bool,
}

/// The visualization engine: one instance per canvas.
pub struct Visualizer {
    config: RenderConfig,
    grid: Grid,
    palette: Palette,
    reactive: AudioReactiveState,
    source: Option<Box<dyn AnalysisSource>>,
    image: Option<SourceImage>,
    strategies: Vec<Box<dyn RenderStrategy>>,
    running: bool,
    background: Rgb,
}

impl Visualizer {
    pub fn new(config: RenderConfig, cols: usize, rows: usize, aspect: f32, seed: u64) -> Self {
        let grid = Grid::new(cols, rows, aspect, config.width);
        let (w, h) = grid.canvas_size();
        let mut config = config;
        config.height = h;
        Self {
            config,
            grid,
            palette: Palette::for_density(config.density),
            reactive: AudioReactiveState::new(SmoothingFactors::default(), BandTuning::default()),
            source: None,
            image: None,
            strategies: make_strategies(w, h, seed),
            running: true,
            background: Rgb::BLACK,
        }
    }

    /// Replaces the current source. The engine stays idle until the new one delivers data.
    pub fn attach(&mut self, source: Box<dyn AnalysisSource>) {
        info!(source = source.name(), "analysis source attached");
        self.reactive.reset();
        self.source = Some(source);
    }

    pub fn detach(&mut self) -> Option<Box<dyn AnalysisSource>> {
        let src = self.source.take();
        if let Some(s) = &src {
            info!(source = s.name(), "analysis source detached");
        }
        src
    }

    /// Drops the source and forgets all analysis state.
    pub fn dispose(&mut self) {
        drop(self.detach());
        self.reactive.reset();
        self.running = false;
    }

    pub fn source_name(&self) -> Option<&'static str> {
        self.source.as_ref().map(|s| s.name())
    }

    pub fn source_age_ms(&self) -> Option<f32> {
        self.source.as_ref().and_then(|s| s.age_ms())
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn reactive(&self) -> &AudioReactiveState {
        &self.reactive
    }

    pub fn smoothing_mut(&mut self) -> &mut SmoothingFactors {
        &mut self.reactive.factors
    }

    pub fn tuning_mut(&mut self) -> &mut BandTuning {
        &mut self.reactive.tuning
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        if mode != self.config.mode {
            debug!(mode = mode.label(), "render mode");
        }
        self.config.mode = mode;
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        self.config.color_mode = color_mode;
    }

    /// Switches to the density's built-in ramp, replacing any custom palette.
    pub fn set_density(&mut self, density: Density) {
        self.config.density = density;
        self.palette = Palette::for_density(density);
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn set_image(&mut self, image: Option<SourceImage>) {
        self.image = image;
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.set_mode(config.mode);
        self.set_color_mode(config.color_mode);
        if config.density != self.config.density {
            self.set_density(config.density);
        }
        self.resize(config.width, config.height);
    }

    /// Idempotent: resizing to the current dimensions changes nothing.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !self.grid.resize(width, height) {
            return false;
        }
        let (w, h) = self.grid.canvas_size();
        self.config.width = w;
        self.config.height = h;
        for s in &mut self.strategies {
            s.on_resize(w, h);
        }
        debug!(width = w, height = h, "canvas resized");
        true
    }

    pub fn set_grid(&mut self, cols: usize, rows: usize) -> bool {
        if !self.grid.set_dims(cols, rows) {
            return false;
        }
        let (w, h) = self.grid.canvas_size();
        self.config.height = h;
        for s in &mut self.strategies {
            s.on_resize(w, h);
        }
        true
    }

    /// Renders one frame. Never fails: a missing source degrades to the idle animation.
    pub fn frame(&mut self, surface: &mut dyn Surface, t: f32, dt: f32) -> FrameReport {
        let mode = self.config.mode;
        if !self.running {
            return FrameReport {
                mode,
                state: FrameState::Stopped,
                drawn: 0,
                fresh: false,
            };
        }

        surface.clear(self.background);

        let fresh = match self.source.as_deref_mut() {
            Some(src) => self.reactive.update(src),
            None => false,
        };

        let frame = match (&self.source, self.reactive.frame()) {
            (Some(_), Some(frame)) => frame,
            _ => {
                let drawn = draw_idle(&self.grid, &self.palette, self.config.color_mode, t, surface);
                return FrameReport {
                    mode,
                    state: FrameState::Idle,
                    drawn,
                    fresh,
                };
            }
        };

        let ctx = ModeCtx {
            t,
            dt,
            grid: &self.grid,
            frame,
            energy: self.reactive.energy(),
            palette: &self.palette,
            color_mode: self.config.color_mode,
            image: self.image.as_ref(),
        };
        let drawn = self
            .strategies
            .iter_mut()
            .find(|s| s.mode() == mode)
            .map(|s| s.draw(&ctx, surface))
            .unwrap_or(0);

        FrameReport {
            mode,
            state: FrameState::Live,
            drawn,
            fresh,
        }
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Slow interference pattern keyed only off wall-clock time and the grid.
pub fn draw_idle(
    grid: &Grid,
    palette: &Palette,
    color_mode: ColorMode,
    t: f32,
    surface: &mut dyn Surface,
) -> usize {
    let breath = 0.55 + 0.45 * (t * 0.8).sin();
    let field = |i: usize, j: usize, g: &Grid| {
        let nx = (i as f32 + 0.5) / g.cols() as f32;
        let ny = (j as f32 + 0.5) / g.rows() as f32;
        let a = (nx * 6.0 + t * 1.3).sin();
        let b = (ny * 4.0 - t * 0.9).sin();
        let c = ((nx + ny) * 5.0 + t * 0.7).sin();
        let v = map_range(a + b + c, -3.0, 3.0, 0.0, 1.0) * breath;
        let brightness = constrain(v * 255.0, 0.0, 255.0);
        let hue = nx * 0.5 + t * 0.02;
        CellSample {
            brightness,
            rgb: hsv_to_rgb(hue, 0.6, v),
            hue,
        }
    };
    let quiet = BandEnergy::default();
    let style = CellStyle {
        palette,
        color_mode,
        size_mode: SizeMode::Fixed,
        energy: &quiet,
        global_energy: 0.0,
        t,
    };
    render_grid(grid, &field, &style, surface)
}
