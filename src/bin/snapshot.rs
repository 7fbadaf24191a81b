use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ascii_reactor::analysis::SynthSource;
use ascii_reactor::app::{CELL_ASPECT, grid_dims};
use ascii_reactor::config::{ColorMode, Density, RenderConfig, RenderMode};
use ascii_reactor::surface::CellCanvas;
use ascii_reactor::visual::Visualizer;
use clap::Parser;
use tracing::info;

/// Renders a few frames of the synthetic source off-screen and dumps the last one as text.
#[derive(Parser, Debug)]
#[command(name = "snapshot")]
struct Args {
    #[arg(long, value_enum, default_value_t = RenderMode::Grid)]
    mode: RenderMode,
    #[arg(long = "color", value_enum, default_value_t = ColorMode::Energy)]
    color_mode: ColorMode,
    #[arg(long, value_enum, default_value_t = Density::Medium)]
    density: Density,
    #[arg(long, default_value_t = 80)]
    cols: u16,
    #[arg(long, default_value_t = 24)]
    rows: u16,
    #[arg(long, default_value_t = 60)]
    frames: u32,
    #[arg(long, default_value_t = 30)]
    fps: u32,
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
    /// Output file. Prints to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    ascii_reactor::logging::init_stderr()?;
    let args = Args::parse();

    let mut canvas = CellCanvas::new(args.cols as usize, args.rows as usize);
    let (cols, rows) = grid_dims(args.cols, args.rows, None);
    let config = RenderConfig {
        mode: args.mode,
        color_mode: args.color_mode,
        density: args.density,
        width: args.cols as f32 * canvas.px_per_col(),
        height: args.rows as f32 * canvas.px_per_row(),
    };
    let mut viz = Visualizer::new(config, cols, rows, CELL_ASPECT, args.seed);
    let fps = args.fps.max(1);
    viz.attach(Box::new(SynthSource::new(48_000, fps, args.seed)));

    let dt = 1.0 / fps as f32;
    let mut drawn = 0;
    for i in 0..args.frames.max(1) {
        drawn = viz.frame(&mut canvas, i as f32 * dt, dt).drawn;
    }
    info!(
        mode = args.mode.label(),
        frames = args.frames,
        drawn,
        glyphs = canvas.glyph_count(),
        "snapshot rendered"
    );

    let text = canvas.to_text();
    match args.out {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "snapshot written");
        }
        None => print!("{text}"),
    }
    Ok(())
}
