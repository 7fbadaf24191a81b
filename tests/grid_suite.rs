use ascii_reactor::color::{CellSample, ENERGY_BOOST, Rgb, cell_color};
use ascii_reactor::config::{ColorMode, Density};
use ascii_reactor::glyph::Palette;
use ascii_reactor::grid::{CellStyle, Grid, SizeMode, glyph_size, render_grid};
use ascii_reactor::signal::{BandEnergy, Smoothed};
use ascii_reactor::surface::{CellCanvas, RecordingSurface, Surface};

fn bass_only(v: f32) -> BandEnergy {
    BandEnergy {
        bass: Smoothed { raw: v, smoothed: v },
        ..BandEnergy::default()
    }
}

// ── geometry ────────────────────────────────────────────────────────────────

#[test]
fn cell_size_follows_width_and_aspect() {
    let g = Grid::new(10, 5, 2.0, 80.0);
    assert_eq!(g.cell_size(), (8.0, 16.0));
    assert_eq!(g.canvas_size(), (80.0, 80.0));
    assert_eq!(g.cell_center(0, 0), (4.0, 8.0));
    assert_eq!(g.cell_center(9, 4), (76.0, 72.0));
}

#[test]
fn square_cells_by_default_aspect() {
    let g = Grid::new(4, 4, 1.0, 100.0);
    assert_eq!(g.cell_size(), (25.0, 25.0));
    assert_eq!(g.canvas_size(), (100.0, 100.0));
}

#[test]
fn resize_is_idempotent() {
    let mut g = Grid::new(10, 5, 2.0, 80.0);
    assert!(!g.resize(80.0, 999.0));

    assert!(g.resize(160.0, 0.0));
    let after = g;
    assert!(!g.resize(160.0, 0.0));
    assert_eq!(g, after);
    assert_eq!(g.cell_size(), (16.0, 32.0));
    // Height is derived, never taken from the request.
    assert_eq!(g.canvas_size(), (160.0, 160.0));
}

#[test]
fn set_dims_keeps_canvas_width() {
    let mut g = Grid::new(10, 5, 2.0, 80.0);
    assert!(!g.set_dims(10, 5));
    assert!(g.set_dims(20, 5));
    assert_eq!(g.cell_size(), (4.0, 8.0));
    assert_eq!(g.canvas_size(), (80.0, 40.0));
}

#[test]
fn zero_dims_become_one() {
    let g = Grid::new(0, 0, 0.0, 50.0);
    assert_eq!((g.cols(), g.rows()), (1, 1));
    assert_eq!(g.cell_size(), (50.0, 50.0));
}

// ── render_grid ─────────────────────────────────────────────────────────────

#[test]
fn one_glyph_per_cell() {
    let grid = Grid::new(12, 7, 2.0, 96.0);
    let palette = Palette::for_density(Density::Medium);
    let energy = BandEnergy::default();
    let style = CellStyle {
        palette: &palette,
        color_mode: ColorMode::Color,
        size_mode: SizeMode::Fixed,
        energy: &energy,
        global_energy: 0.0,
        t: 0.0,
    };
    let field = |_: usize, _: usize, _: &Grid| CellSample::gray(255.0);

    let mut surface = RecordingSurface::new(96.0, 112.0);
    let drawn = render_grid(&grid, &field, &style, &mut surface);
    assert_eq!(drawn, 12 * 7);
    assert_eq!(surface.glyph_count(), 12 * 7);
    for (x, y, size, ch, color) in surface.glyphs() {
        assert_eq!(ch, palette.densest());
        assert_eq!(size, 16.0);
        assert_eq!(color, Rgb::new(255, 255, 255));
        assert!(x > 0.0 && x < 96.0 && y > 0.0 && y < 112.0);
    }
}

#[test]
fn grid_lands_on_terminal_cells() {
    let grid = Grid::new(10, 4, 2.0, 80.0);
    let palette = Palette::new("#.").expect("palette");
    let energy = BandEnergy::default();
    let style = CellStyle {
        palette: &palette,
        color_mode: ColorMode::Mono,
        size_mode: SizeMode::Fixed,
        energy: &energy,
        global_energy: 0.0,
        t: 0.0,
    };
    let field = |i: usize, _: usize, _: &Grid| CellSample::gray(if i % 2 == 0 { 255.0 } else { 0.0 });

    let mut canvas = CellCanvas::new(10, 4);
    render_grid(&grid, &field, &style, &mut canvas);
    let text = canvas.to_text();
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 4);
    for line in lines {
        assert_eq!(line, "#.#.#.#.#.");
    }
}

#[test]
fn size_modes() {
    let bright = CellSample::gray(255.0);
    let dark = CellSample::gray(0.0);
    assert_eq!(glyph_size(SizeMode::Fixed, 16.0, &dark, 1.0), 16.0);
    assert_eq!(glyph_size(SizeMode::Brightness, 16.0, &bright, 0.0), 16.0);
    assert!((glyph_size(SizeMode::Brightness, 16.0, &dark, 0.0) - 6.4).abs() < 1e-5);
    assert_eq!(glyph_size(SizeMode::Energy, 16.0, &dark, 0.0), 8.0);
    assert_eq!(glyph_size(SizeMode::Energy, 16.0, &dark, 1.0), 32.0);
    assert_eq!(glyph_size(SizeMode::Energy, 16.0, &dark, 5.0), 32.0);
}

// ── color modes ─────────────────────────────────────────────────────────────

#[test]
fn mono_and_color_modes() {
    let s = CellSample {
        brightness: 100.0,
        rgb: Rgb::new(10, 20, 30),
        hue: 0.5,
    };
    let e = bass_only(200.0);
    assert_eq!(cell_color(ColorMode::Mono, &s, &e, 0.0), Rgb::MONO);
    assert_eq!(cell_color(ColorMode::Color, &s, &e, 0.0), Rgb::new(10, 20, 30));
}

#[test]
fn energy_mode_boosts_matching_channel() {
    let s = CellSample {
        brightness: 100.0,
        rgb: Rgb::new(10, 10, 10),
        hue: 0.0,
    };
    let c = cell_color(ColorMode::Energy, &s, &bass_only(100.0), 0.0);
    assert_eq!(c, Rgb::new((10.0 + 100.0 * ENERGY_BOOST) as u8, 10, 10));

    let hot = CellSample {
        rgb: Rgb::new(250, 250, 250),
        ..s
    };
    assert_eq!(cell_color(ColorMode::Energy, &hot, &bass_only(255.0), 0.0).r, 255);
}

#[test]
fn hue_mode_never_goes_black() {
    let s = CellSample {
        brightness: 0.0,
        rgb: Rgb::BLACK,
        hue: 0.2,
    };
    let c = cell_color(ColorMode::Hue, &s, &BandEnergy::default(), 3.0);
    assert!(c.r > 0 || c.g > 0 || c.b > 0);
}

// ── cell canvas ─────────────────────────────────────────────────────────────

#[test]
fn canvas_clips_out_of_bounds_draws() {
    let mut canvas = CellCanvas::new(10, 5);
    canvas.clear(Rgb::BLACK);
    canvas.glyph(-1.0, 8.0, 16.0, 'X', Rgb::MONO);
    canvas.glyph(1_000.0, 8.0, 16.0, 'X', Rgb::MONO);
    canvas.glyph(4.0, f32::NAN, 16.0, 'X', Rgb::MONO);
    assert_eq!(canvas.glyph_count(), 0);

    canvas.glyph(4.0, 8.0, 16.0, 'X', Rgb::MONO);
    assert_eq!(canvas.cell(0, 0).map(|c| c.ch), Some('X'));
    assert_eq!(canvas.glyph_count(), 1);
}

#[test]
fn tiny_glyphs_are_skipped_and_small_ones_dimmed() {
    let mut canvas = CellCanvas::new(4, 1);
    canvas.glyph(4.0, 8.0, 0.5, 'X', Rgb::new(200, 200, 200));
    assert_eq!(canvas.glyph_count(), 0);

    canvas.glyph(4.0, 8.0, 8.0, 'X', Rgb::new(200, 200, 200));
    assert_eq!(canvas.cell(0, 0).map(|c| c.fg), Some(Rgb::new(100, 100, 100)));
}

#[test]
fn polyline_rasterizes_with_slope_glyphs() {
    let mut canvas = CellCanvas::new(10, 5);
    canvas.polyline(&[(4.0, 8.0), (76.0, 8.0)], Rgb::MONO);
    assert_eq!(canvas.to_text().lines().next(), Some("----------"));

    let mut canvas = CellCanvas::new(3, 3);
    canvas.polyline(&[(4.0, 8.0), (4.0, 40.0)], Rgb::MONO);
    assert_eq!(canvas.to_text(), "|  \n|  \n|  \n");
}

#[test]
fn fill_rect_clips_to_the_canvas() {
    let red = Rgb::new(200, 0, 0);
    let mut canvas = CellCanvas::new(4, 3);
    canvas.clear(Rgb::BLACK);
    // Starts left of and above the canvas, ends inside cell (1, 1).
    canvas.fill_rect(-20.0, -20.0, 36.0, 52.0, red);
    for row in 0..3 {
        for col in 0..4 {
            let bg = canvas.cell(col, row).map(|c| c.bg);
            let want = if col <= 1 && row <= 1 { red } else { Rgb::BLACK };
            assert_eq!(bg, Some(want), "cell ({col}, {row})");
        }
    }

    let mut canvas = CellCanvas::new(4, 3);
    canvas.fill_rect(0.0, 0.0, 0.0, 10.0, red);
    canvas.fill_rect(0.0, 0.0, f32::NAN, 10.0, red);
    canvas.fill_rect(500.0, 500.0, 10.0, 10.0, red);
    assert!(canvas.cells().iter().all(|c| c.bg == Rgb::BLACK));
}

#[test]
fn huge_circle_covers_the_canvas() {
    let blue = Rgb::new(0, 0, 200);
    let mut canvas = CellCanvas::new(6, 4);
    canvas.fill_circle(24.0, 32.0, 1.0e6, blue);
    assert!(canvas.cells().iter().all(|c| c.bg == blue && c.ch == ' '));
}

#[test]
fn circle_fills_cells_whose_centers_are_inside() {
    let blue = Rgb::new(0, 0, 200);
    let mut canvas = CellCanvas::new(5, 3);
    // Centered on cell (2, 1); reaches the horizontal neighbours but not the rows above or below.
    canvas.fill_circle(20.0, 24.0, 9.0, blue);
    let filled: Vec<(usize, usize)> = (0..3)
        .flat_map(|row| (0..5).map(move |col| (col, row)))
        .filter(|&(col, row)| canvas.cell(col, row).map(|c| c.bg) == Some(blue))
        .collect();
    assert_eq!(filled, vec![(1, 1), (2, 1), (3, 1)]);
}

#[test]
fn sub_cell_circles_become_a_dot() {
    let mut canvas = CellCanvas::new(4, 2);
    canvas.fill_circle(12.0, 8.0, 3.0, Rgb::MONO);
    assert_eq!(canvas.cell(1, 0).map(|c| (c.ch, c.fg)), Some(('•', Rgb::MONO)));
    assert_eq!(canvas.glyph_count(), 1);

    // Dots off the canvas are dropped.
    canvas.fill_circle(-12.0, 8.0, 3.0, Rgb::MONO);
    assert_eq!(canvas.glyph_count(), 1);
}

#[test]
fn degenerate_circles_draw_nothing() {
    let mut canvas = CellCanvas::new(4, 2);
    canvas.fill_circle(12.0, 8.0, 0.0, Rgb::MONO);
    canvas.fill_circle(12.0, 8.0, -5.0, Rgb::MONO);
    canvas.fill_circle(12.0, 8.0, f32::NAN, Rgb::MONO);
    canvas.fill_circle(f32::NAN, 8.0, 20.0, Rgb::MONO);
    assert_eq!(canvas.glyph_count(), 0);
    assert!(canvas.cells().iter().all(|c| c.bg == Rgb::BLACK));
}

#[test]
fn resize_cells_reallocates() {
    let mut canvas = CellCanvas::new(2, 2);
    canvas.resize_cells(5, 3);
    assert_eq!((canvas.cols(), canvas.rows()), (5, 3));
    assert_eq!(canvas.width(), 40.0);
    assert_eq!(canvas.height(), 48.0);
    assert_eq!(canvas.cells().len(), 15);
}
