use crate::color::{CellSample, cell_color, hsv_to_rgb};
use crate::config::RenderMode;
use crate::glyph::select_glyph;
use crate::grid::{CellStyle, Grid, SizeMode, render_grid};
use crate::mapping::{constrain, index_for, map_range};
use crate::signal::{Band, mean_abs_amplitude};
use crate::surface::Surface;
use crate::visual::{ModeCtx, RenderStrategy};
use std::f32::consts::TAU;

/// Waveform sample under a continuous position in `[0, pos_max)`; 0 for an empty buffer.
pub(crate) fn wave_at(wave: &[f32], pos: f32, pos_max: f32) -> f32 {
    index_for(pos, pos_max, wave.len())
        .map(|i| wave[i])
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub struct GridMode;

impl GridMode {
    /// Lights cells near the waveform trace of their column; the trace thickens with
    /// the column's amplitude.
    fn audio_sample(wave: &[f32], i: usize, j: usize, grid: &Grid) -> CellSample {
        let amp = wave_at(wave, i as f32, grid.cols() as f32);
        let nx = (i as f32 + 0.5) / grid.cols() as f32;
        let ny = (j as f32 + 0.5) / grid.rows() as f32;
        let trace_y = map_range(constrain(amp, -1.0, 1.0), -1.0, 1.0, 1.0, 0.0);
        let spread = 0.12 + 0.4 * amp.abs();
        let brightness = constrain(
            map_range((ny - trace_y).abs(), 0.0, spread, 255.0, 0.0),
            0.0,
            255.0,
        );
        CellSample {
            brightness,
            rgb: hsv_to_rgb(nx * 0.8, 0.75, 0.35 + 0.65 * brightness / 255.0),
            hue: nx,
        }
    }
}

impl RenderStrategy for GridMode {
    fn mode(&self) -> RenderMode {
        RenderMode::Grid
    }

    fn draw(&mut self, ctx: &ModeCtx<'_>, surface: &mut dyn Surface) -> usize {
        let wave = ctx.frame.waveform.as_slice();
        let style = CellStyle {
            palette: ctx.palette,
            color_mode: ctx.color_mode,
            size_mode: SizeMode::Energy,
            energy: ctx.energy,
            global_energy: mean_abs_amplitude(wave),
            t: ctx.t,
        };
        match ctx.image {
            Some(img) => render_grid(ctx.grid, img, &style, surface),
            None => {
                let field = |i: usize, j: usize, g: &Grid| Self::audio_sample(wave, i, j, g);
                render_grid(ctx.grid, &field, &style, surface)
            }
        }
    }
}

pub struct WaveformMode;

impl RenderStrategy for WaveformMode {
    fn mode(&self) -> RenderMode {
        RenderMode::Waveform
    }

    fn draw(&mut self, ctx: &ModeCtx<'_>, surface: &mut dyn Surface) -> usize {
        let wave = ctx.frame.waveform.as_slice();
        let (_, canvas_h) = ctx.grid.canvas_size();
        let (_, cell_h) = ctx.grid.cell_size();
        let cols = ctx.grid.cols();

        for i in 0..cols {
            let (x, _) = ctx.grid.cell_center(i, 0);
            let amp = constrain(wave_at(wave, i as f32, cols as f32), -1.0, 1.0);
            let y = map_range(amp, -1.0, 1.0, canvas_h, 0.0);
            let brightness = constrain(map_range(amp.abs(), 0.0, 1.0, 96.0, 255.0), 0.0, 255.0);
            let hue = i as f32 / cols as f32;
            let sample = CellSample {
                brightness,
                rgb: hsv_to_rgb(hue, 0.7, brightness / 255.0),
                hue,
            };
            let ch = select_glyph(brightness, ctx.palette);
            let color = cell_color(ctx.color_mode, &sample, ctx.energy, ctx.t);
            surface.glyph(x, y, cell_h * (0.6 + amp.abs()), ch, color);
        }
        cols
    }
}

pub const RINGS: usize = 6;
pub const SLOTS_PER_RING: usize = 48;

pub struct CircularMode;

impl RenderStrategy for CircularMode {
    fn mode(&self) -> RenderMode {
        RenderMode::Circular
    }

    fn draw(&mut self, ctx: &ModeCtx<'_>, surface: &mut dyn Surface) -> usize {
        let wave = ctx.frame.waveform.as_slice();
        let (w, h) = ctx.grid.canvas_size();
        let (_, cell_h) = ctx.grid.cell_size();
        let (cx, cy) = (w * 0.5, h * 0.5);
        let spacing = w.min(h) * 0.45 / RINGS as f32;
        let bass = ctx.energy.level(Band::Bass);
        let total = (RINGS * SLOTS_PER_RING) as f32;

        let mut drawn = 0usize;
        for ring in 0..RINGS {
            let base_r = (ring + 1) as f32 * spacing;
            let dir = if ring % 2 == 0 { 1.0 } else { -1.0 };
            let spin = ctx.t * 0.2 * dir;
            let hue = ring as f32 / RINGS as f32;
            for slot in 0..SLOTS_PER_RING {
                let theta = slot as f32 / SLOTS_PER_RING as f32 * TAU + spin;
                let amp = constrain(
                    wave_at(wave, (ring * SLOTS_PER_RING + slot) as f32, total),
                    -1.0,
                    1.0,
                );
                let r = base_r + amp * spacing * (1.0 + bass);
                let x = cx + theta.cos() * r;
                let y = cy + theta.sin() * r;
                let brightness =
                    constrain(map_range(amp.abs(), 0.0, 1.0, 90.0, 255.0), 0.0, 255.0);
                let sample = CellSample {
                    brightness,
                    rgb: hsv_to_rgb(hue, 0.8, brightness / 255.0),
                    hue,
                };
                let ch = select_glyph(brightness, ctx.palette);
                let color = cell_color(ctx.color_mode, &sample, ctx.energy, ctx.t);
                surface.glyph(x, y, cell_h * (0.7 + amp.abs()), ch, color);
                drawn += 1;
            }
        }
        drawn
    }
}

pub const MESH_COLS: usize = 24;
pub const MESH_ROWS: usize = 14;
pub const MESH_ROW_FREQ: f32 = 0.45;
pub const MESH_PHASE_STEP: f32 = 0.03;

/// Vertical displacement of a mesh vertex.
pub fn mesh_displacement(amplitude: f32, row: usize, phase: f32) -> f32 {
    map_range(amplitude, 0.0, 1.0, 0.0, 100.0) * (row as f32 * MESH_ROW_FREQ + phase).sin()
}

pub struct MeshMode {
    phase: f32,
    vertices: Vec<(f32, f32)>,
}

impl MeshMode {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            vertices: Vec::with_capacity(MESH_COLS * MESH_ROWS),
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

impl Default for MeshMode {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStrategy for MeshMode {
    fn mode(&self) -> RenderMode {
        RenderMode::Mesh
    }

    fn draw(&mut self, ctx: &ModeCtx<'_>, surface: &mut dyn Surface) -> usize {
        let wave = ctx.frame.waveform.as_slice();
        let (w, h) = ctx.grid.canvas_size();
        let (_, cell_h) = ctx.grid.cell_size();
        let cx = w * 0.5;
        let last_col = (MESH_COLS - 1) as f32;
        let last_row = (MESH_ROWS - 1) as f32;

        self.vertices.clear();
        for r in 0..MESH_ROWS {
            // Rows further back are narrower.
            let depth = map_range(r as f32, 0.0, last_row, 0.6, 1.0);
            let y0 = map_range(r as f32, 0.0, last_row, h * 0.2, h * 0.85);
            for c in 0..MESH_COLS {
                let amp = constrain(wave_at(wave, c as f32, MESH_COLS as f32).abs(), 0.0, 1.0);
                let x = map_range(c as f32, 0.0, last_col, w * 0.08, w * 0.92);
                let x = cx + (x - cx) * depth;
                let y = y0 - mesh_displacement(amp, r, self.phase);
                self.vertices.push((x, y));
            }
        }

        let mut drawn = 0usize;
        let mut line = Vec::with_capacity(MESH_COLS.max(MESH_ROWS));
        for r in 0..MESH_ROWS {
            line.clear();
            line.extend_from_slice(&self.vertices[r * MESH_COLS..(r + 1) * MESH_COLS]);
            let hue = r as f32 / MESH_ROWS as f32;
            let sample = CellSample {
                brightness: 160.0,
                rgb: hsv_to_rgb(hue, 0.6, 0.7),
                hue,
            };
            surface.polyline(&line, cell_color(ctx.color_mode, &sample, ctx.energy, ctx.t));
            drawn += 1;
        }
        for c in 0..MESH_COLS {
            line.clear();
            line.extend((0..MESH_ROWS).map(|r| self.vertices[r * MESH_COLS + c]));
            let hue = c as f32 / MESH_COLS as f32;
            let sample = CellSample {
                brightness: 120.0,
                rgb: hsv_to_rgb(hue, 0.5, 0.55),
                hue,
            };
            surface.polyline(&line, cell_color(ctx.color_mode, &sample, ctx.energy, ctx.t));
            drawn += 1;
        }
        for (n, &(x, y)) in self.vertices.iter().enumerate() {
            let c = n % MESH_COLS;
            let amp = constrain(wave_at(wave, c as f32, MESH_COLS as f32).abs(), 0.0, 1.0);
            let brightness = map_range(amp, 0.0, 1.0, 128.0, 255.0);
            let hue = (n / MESH_COLS) as f32 / MESH_ROWS as f32;
            let sample = CellSample {
                brightness,
                rgb: hsv_to_rgb(hue, 0.6, brightness / 255.0),
                hue,
            };
            let ch = select_glyph(brightness, ctx.palette);
            surface.glyph(
                x,
                y,
                cell_h,
                ch,
                cell_color(ctx.color_mode, &sample, ctx.energy, ctx.t),
            );
            drawn += 1;
        }

        self.phase = (self.phase + MESH_PHASE_STEP) % TAU;
        drawn
    }
}
