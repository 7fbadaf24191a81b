use crate::color::{CellSample, cell_color};
use crate::config::ColorMode;
use crate::glyph::{Palette, select_glyph};
use crate::mapping::constrain;
use crate::signal::BandEnergy;
use crate::surface::Surface;

/// Fixed logical grid laid over the canvas.
///
/// `cell_w = canvas_w / cols`, `cell_h = cell_w * aspect`, and the canvas height is
/// always re-derived as `cell_h * rows`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    aspect: f32,
    cell_w: f32,
    cell_h: f32,
    canvas_w: f32,
    canvas_h: f32,
}

impl Grid {
    pub fn new(cols: usize, rows: usize, aspect: f32, canvas_w: f32) -> Self {
        let mut g = Self {
            cols: cols.max(1),
            rows: rows.max(1),
            aspect: if aspect > 0.0 { aspect } else { 1.0 },
            cell_w: 0.0,
            cell_h: 0.0,
            canvas_w: 0.0,
            canvas_h: 0.0,
        };
        g.resize(canvas_w, 0.0);
        g
    }

    /// Recomputes cell size from the new canvas width. The requested height is ignored:
    /// the grid keeps its aspect. Returns whether anything changed.
    pub fn resize(&mut self, canvas_w: f32, _canvas_h: f32) -> bool {
        let canvas_w = if canvas_w.is_finite() { canvas_w.max(0.0) } else { 0.0 };
        let cell_w = canvas_w / self.cols as f32;
        let cell_h = cell_w * self.aspect;
        let canvas_h = cell_h * self.rows as f32;
        let changed = cell_w != self.cell_w || canvas_w != self.canvas_w;
        self.canvas_w = canvas_w;
        self.cell_w = cell_w;
        self.cell_h = cell_h;
        self.canvas_h = canvas_h;
        changed
    }

    /// Changes the cell counts, keeping the canvas width.
    pub fn set_dims(&mut self, cols: usize, rows: usize) -> bool {
        let (cols, rows) = (cols.max(1), rows.max(1));
        if cols == self.cols && rows == self.rows {
            return false;
        }
        self.cols = cols;
        self.rows = rows;
        self.resize(self.canvas_w, self.canvas_h);
        true
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_w, self.cell_h)
    }

    pub fn canvas_size(&self) -> (f32, f32) {
        (self.canvas_w, self.canvas_h)
    }

    pub fn cell_center(&self, i: usize, j: usize) -> (f32, f32) {
        (
            i as f32 * self.cell_w + self.cell_w * 0.5,
            j as f32 * self.cell_h + self.cell_h * 0.5,
        )
    }
}

/// Anything the grid can sample once per cell.
pub trait CellField {
    fn sample(&self, i: usize, j: usize, grid: &Grid) -> CellSample;
}

impl<F: Fn(usize, usize, &Grid) -> CellSample> CellField for F {
    fn sample(&self, i: usize, j: usize, grid: &Grid) -> CellSample {
        self(i, j, grid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeMode {
    Fixed,
    /// Grows with the cell's brightness.
    Brightness,
    /// Uniform scale from the frame's global energy.
    Energy,
}

pub fn glyph_size(mode: SizeMode, base: f32, sample: &CellSample, global_energy: f32) -> f32 {
    match mode {
        SizeMode::Fixed => base,
        SizeMode::Brightness => base * (0.4 + 0.6 * constrain(sample.brightness / 255.0, 0.0, 1.0)),
        SizeMode::Energy => base * (0.5 + 1.5 * constrain(global_energy, 0.0, 1.0)),
    }
}

pub struct CellStyle<'a> {
    pub palette: &'a Palette,
    pub color_mode: ColorMode,
    pub size_mode: SizeMode,
    pub energy: &'a BandEnergy,
    /// Mean absolute amplitude of the frame, 0..1.
    pub global_energy: f32,
    pub t: f32,
}

/// Walks every cell and issues exactly one glyph draw per cell. Returns the cell count.
pub fn render_grid(
    grid: &Grid,
    field: &dyn CellField,
    style: &CellStyle<'_>,
    surface: &mut dyn Surface,
) -> usize {
    let (_, cell_h) = grid.cell_size();
    let mut drawn = 0usize;
    for j in 0..grid.rows() {
        for i in 0..grid.cols() {
            let (x, y) = grid.cell_center(i, j);
            let sample = field.sample(i, j, grid);
            let ch = select_glyph(sample.brightness, style.palette);
            let color = cell_color(style.color_mode, &sample, style.energy, style.t);
            let size = glyph_size(style.size_mode, cell_h, &sample, style.global_energy);
            surface.glyph(x, y, size, ch, color);
            drawn += 1;
        }
    }
    drawn
}
