use crate::color::{CellSample, Rgb};
use crate::grid::{CellField, Grid};
use anyhow::Context;
use std::path::Path;

/// Still RGBA image sampled per grid cell.
#[derive(Debug, Clone)]
pub struct SourceImage {
    width: usize,
    height: usize,
    pixels_rgba: Vec<u8>,
}

impl SourceImage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("open image {}", path.display()))?
            .to_rgba8();
        let (w, h) = img.dimensions();
        Self::from_rgba(w as usize, h as usize, img.into_raw())
            .with_context(|| format!("decode image {}", path.display()))
    }

    pub fn from_rgba(width: usize, height: usize, pixels_rgba: Vec<u8>) -> anyhow::Result<Self> {
        if width == 0 || height == 0 {
            anyhow::bail!("image has zero size ({width}x{height})");
        }
        let need = width.saturating_mul(height).saturating_mul(4);
        if pixels_rgba.len() < need {
            anyhow::bail!(
                "pixel buffer too small (need {need}, got {})",
                pixels_rgba.len()
            );
        }
        Ok(Self {
            width,
            height,
            pixels_rgba,
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Nearest-neighbour lookup at normalized coordinates; out-of-range clamps to the edge.
    pub fn pixel_at(&self, nx: f32, ny: f32) -> Rgb {
        let fx = if nx.is_finite() { nx.clamp(0.0, 1.0) } else { 0.0 };
        let fy = if ny.is_finite() { ny.clamp(0.0, 1.0) } else { 0.0 };
        let x = ((fx * self.width as f32) as usize).min(self.width - 1);
        let y = ((fy * self.height as f32) as usize).min(self.height - 1);
        let i = (y * self.width + x) * 4;
        Rgb::new(
            self.pixels_rgba[i],
            self.pixels_rgba[i + 1],
            self.pixels_rgba[i + 2],
        )
    }
}

impl CellField for SourceImage {
    fn sample(&self, i: usize, j: usize, grid: &Grid) -> CellSample {
        let nx = (i as f32 + 0.5) / grid.cols() as f32;
        let ny = (j as f32 + 0.5) / grid.rows() as f32;
        let rgb = self.pixel_at(nx, ny);
        CellSample {
            brightness: rgb.luma(),
            rgb,
            hue: nx,
        }
    }
}
