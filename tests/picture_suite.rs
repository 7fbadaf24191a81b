use ascii_reactor::analysis::{AnalysisFrame, AnalysisSource};
use ascii_reactor::color::Rgb;
use ascii_reactor::config::{ColorMode, Density, RenderConfig, RenderMode};
use ascii_reactor::grid::{CellField, Grid};
use ascii_reactor::picture::SourceImage;
use ascii_reactor::surface::CellCanvas;
use ascii_reactor::visual::Visualizer;

/// Left half white, right half black.
fn split_image(w: usize, h: usize) -> SourceImage {
    let mut px = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w / 2 {
            let i = (y * w + x) * 4;
            px[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    SourceImage::from_rgba(w, h, px).expect("valid image")
}

struct Quiet;

impl AnalysisSource for Quiet {
    fn name(&self) -> &'static str {
        "quiet"
    }

    fn read(&mut self, _frame: &mut AnalysisFrame) -> bool {
        true
    }
}

#[test]
fn rejects_malformed_buffers() {
    assert!(SourceImage::from_rgba(0, 4, Vec::new()).is_err());
    assert!(SourceImage::from_rgba(2, 2, vec![0; 15]).is_err());
    assert!(SourceImage::from_rgba(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn pixel_lookup_clamps_to_edges() {
    let img = split_image(4, 2);
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.pixel_at(0.0, 0.0), Rgb::new(255, 255, 255));
    assert_eq!(img.pixel_at(1.0, 1.0), Rgb::BLACK);
    assert_eq!(img.pixel_at(-3.0, 0.5), Rgb::new(255, 255, 255));
    assert_eq!(img.pixel_at(f32::NAN, 0.5), Rgb::new(255, 255, 255));
}

#[test]
fn cells_sample_luma() {
    let img = split_image(8, 8);
    let grid = Grid::new(2, 2, 1.0, 16.0);
    assert!((img.sample(0, 0, &grid).brightness - 255.0).abs() < 0.01);
    assert_eq!(img.sample(1, 1, &grid).brightness, 0.0);
}

#[test]
fn grid_mode_draws_the_image() {
    let config = RenderConfig {
        mode: RenderMode::Grid,
        color_mode: ColorMode::Color,
        density: Density::Low,
        width: 80.0,
        height: 0.0,
    };
    let mut viz = Visualizer::new(config, 10, 4, 2.0, 1);
    viz.set_image(Some(split_image(10, 4)));
    viz.attach(Box::new(Quiet));

    let mut canvas = CellCanvas::new(10, 4);
    let report = viz.frame(&mut canvas, 0.0, 0.0);
    assert_eq!(report.drawn, 40);
    for line in canvas.to_text().lines() {
        assert_eq!(line, "@@@@@     ");
    }
}
