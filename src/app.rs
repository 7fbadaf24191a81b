use crate::analysis::{AnalysisSource, SynthSource};
use crate::audio::AudioSystem;
use crate::command::{Command, parse_script};
use crate::config::{AudioSource, Config, RenderMode};
use crate::glyph::Palette;
use crate::picture::SourceImage;
use crate::render::{AnsiPresenter, Frame, PlainPresenter, Presenter};
use crate::surface::CellCanvas;
use crate::terminal::TerminalGuard;
use crate::visual::{FrameState, Visualizer};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::fs;
use std::io::BufWriter;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Grid cells are twice as tall as they are wide, like a terminal cell.
pub const CELL_ASPECT: f32 = 2.0;
const SYNTH_SAMPLE_RATE_HZ: u32 = 48_000;

pub fn run(cfg: Config) -> anyhow::Result<()> {
    // Everything that can fail on bad input happens before the terminal is taken over.
    let palette = match cfg.palette.as_deref() {
        Some(ramp) => Some(Palette::new(ramp).context("--palette must not be empty")?),
        None => None,
    };
    let image = match cfg.image.as_deref() {
        Some(path) => Some(SourceImage::open(path)?),
        None => None,
    };
    let commands = match cfg.commands.as_deref() {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read command script {}", path.display()))?;
            let parsed =
                parse_script(&text).with_context(|| format!("parse {}", path.display()))?;
            terminal_commands(parsed)
        }
        None => Vec::new(),
    };

    let source = open_source(&cfg);

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());

    let mut presenter: Box<dyn Presenter> = if cfg.plain {
        Box::new(PlainPresenter::new())
    } else {
        Box::new(AnsiPresenter::new())
    };

    let mut last_size = TerminalGuard::size();
    let mut show_hud = true;
    let mut show_help = false;
    let mut hud_rows = hud_rows_for(last_size.1, show_hud);

    let (cols, rows) = grid_dims(last_size.0, visual_rows(last_size.1, hud_rows), cfg.cols);
    let mut canvas = CellCanvas::new(
        last_size.0 as usize,
        visual_rows(last_size.1, hud_rows) as usize,
    );
    let canvas_w = last_size.0 as f32 * canvas.px_per_col();
    let mut viz = Visualizer::new(
        cfg.render_config(canvas_w, 0.0),
        cols,
        rows,
        CELL_ASPECT,
        cfg.seed,
    );
    if let Some(p) = palette {
        viz.set_palette(p);
    }
    viz.set_image(image);
    if let Some(src) = source {
        viz.attach(src);
    }
    for cmd in &commands {
        viz.apply(cmd);
    }
    info!(
        cols,
        rows,
        mode = viz.config().mode.label(),
        source = viz.source_name().unwrap_or("idle"),
        "visualizer ready"
    );

    let start = Instant::now();
    let mut last_frame = start;
    let mut fps = FpsCounter::new();

    loop {
        let now = Instant::now();

        let mut layout_dirty = false;
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = show_hud;
                    if handle_key(k.code, k.modifiers, &mut viz, &mut show_hud, &mut show_help) {
                        return Ok(());
                    }
                    layout_dirty |= show_hud != old_hud;
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    layout_dirty = true;
                }
                _ => {}
            }
        }

        // Some terminals drop resize events.
        let sz = TerminalGuard::size();
        if sz != last_size {
            last_size = sz;
            layout_dirty = true;
        }
        if layout_dirty {
            hud_rows = hud_rows_for(last_size.1, show_hud);
            relayout(&mut viz, &mut canvas, last_size, hud_rows, cfg.cols);
        }

        let dt = now.duration_since(last_frame).as_secs_f32().max(1e-6);
        last_frame = now;
        let t = now.duration_since(start).as_secs_f32();

        let report = viz.frame(&mut canvas, t, dt);
        fps.tick();

        let hud = if show_hud {
            build_hud(&viz, report.state, fps.fps())
        } else {
            String::new()
        };
        let frame = Frame {
            term_cols: last_size.0,
            term_rows: last_size.1,
            canvas: &canvas,
            hud: &hud,
            hud_rows,
            overlay: show_help.then_some(help_popup_text()),
            sync_updates: cfg.sync_updates,
        };
        presenter.present(&frame, &mut out)?;

        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn open_source(cfg: &Config) -> Option<Box<dyn AnalysisSource>> {
    match cfg.source {
        AudioSource::Mic => match AudioSystem::new(cfg.device.as_deref()) {
            Ok(audio) => Some(Box::new(audio)),
            Err(err) => {
                warn!("microphone unavailable, running idle: {err:#}");
                None
            }
        },
        AudioSource::Synth => Some(Box::new(SynthSource::new(
            SYNTH_SAMPLE_RATE_HZ,
            cfg.fps,
            cfg.seed,
        ))),
        AudioSource::Off => None,
    }
}

/// Drops commands the terminal owns. The canvas always follows the window, so a
/// scripted `size` would leave the grid out of step with it.
pub fn terminal_commands(commands: Vec<Command>) -> Vec<Command> {
    commands
        .into_iter()
        .filter(|cmd| match cmd {
            Command::Size { width, height } => {
                warn!(width, height, "ignoring scripted size; the terminal sets the canvas size");
                false
            }
            _ => true,
        })
        .collect()
}

/// Grid dimensions for a terminal area. With the default column count every grid cell
/// lands on exactly one terminal cell.
pub fn grid_dims(term_cols: u16, visual_rows: u16, cols: Option<u16>) -> (usize, usize) {
    let term_cols = term_cols.max(1) as f32;
    let cols = cols.map(|c| c.max(1) as f32).unwrap_or(term_cols);
    let cell_w = term_cols * CellCanvas::PX_PER_COL / cols;
    let cell_h = cell_w * CELL_ASPECT;
    let canvas_h = visual_rows as f32 * CellCanvas::PX_PER_ROW;
    let rows = (canvas_h / cell_h).floor().max(1.0);
    (cols as usize, rows as usize)
}

fn relayout(
    viz: &mut Visualizer,
    canvas: &mut CellCanvas,
    size: (u16, u16),
    hud_rows: u16,
    cols: Option<u16>,
) {
    let rows = visual_rows(size.1, hud_rows);
    canvas.resize_cells(size.0 as usize, rows as usize);
    let (grid_cols, grid_rows) = grid_dims(size.0, rows, cols);
    viz.set_grid(grid_cols, grid_rows);
    viz.resize(size.0 as f32 * canvas.px_per_col(), rows as f32 * canvas.px_per_row());
}

fn visual_rows(term_rows: u16, hud_rows: u16) -> u16 {
    term_rows.saturating_sub(hud_rows).max(1)
}

fn hud_rows_for(term_rows: u16, show_hud: bool) -> u16 {
    if !show_hud || term_rows <= 1 {
        return 0;
    }
    (term_rows - 1).min(2)
}

fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    viz: &mut Visualizer,
    show_hud: &mut bool,
    show_help: &mut bool,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        KeyCode::Char('m') | KeyCode::Right => viz.set_mode(viz.config().mode.next()),
        KeyCode::Char('M') | KeyCode::Left => viz.set_mode(viz.config().mode.prev()),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            viz.set_mode(RenderMode::all()[idx]);
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            viz.set_color_mode(viz.config().color_mode.next())
        }
        KeyCode::Char('d') | KeyCode::Char('D') => viz.set_density(viz.config().density.next()),
        KeyCode::Char(' ') => {
            if viz.is_running() {
                viz.stop();
            } else {
                viz.start();
            }
        }
        KeyCode::Char('h') | KeyCode::Char('H') => *show_hud = !*show_hud,
        KeyCode::Char('?') | KeyCode::F(1) => *show_help = !*show_help,
        _ => {}
    }
    false
}

fn build_hud(viz: &Visualizer, state: FrameState, fps: f32) -> String {
    let cfg = viz.config();
    let energy = viz.reactive().energy();
    let state = match state {
        FrameState::Live => "live",
        FrameState::Idle => "idle",
        FrameState::Stopped => "stopped",
    };
    let lag = viz
        .source_age_ms()
        .map(|ms| format!(", {ms:.0} ms"))
        .unwrap_or_default();
    format!(
        "Mode: {} | Color: {} | Density: {} | Source: {} ({}{}) | Grid: {}x{} | FPS: {:>4.1}\n\
         Bass {:>5.1} | Mid {:>5.1} | Treble {:>5.1} | Vol {:>5.1} | m mode  c color  d density  space play/stop  ? help",
        cfg.mode.label(),
        cfg.color_mode.label(),
        cfg.density.label(),
        viz.source_name().unwrap_or("none"),
        state,
        lag,
        viz.grid().cols(),
        viz.grid().rows(),
        fps,
        energy.bass.smoothed,
        energy.mid.smoothed,
        energy.treble.smoothed,
        energy.volume.smoothed,
    )
}

fn help_popup_text() -> &'static str {
    "ASCII Reactor Hotkeys\n\
m / M  next / previous render mode\n\
1 2 3 4 5  grid / waveform / circular / particles / mesh\n\
c  cycle color mode: mono / color / hue / energy\n\
d  cycle glyph density: low / medium / high\n\
space  play / stop\n\
h  show/hide HUD\n\
?  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
