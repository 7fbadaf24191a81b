use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "ascii-reactor", version, about = "Audio-reactive ASCII visualizer for the terminal")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = AudioSource::Mic)]
    pub source: AudioSource,

    #[arg(long, value_enum, default_value_t = RenderMode::Grid)]
    pub mode: RenderMode,

    #[arg(long = "color", value_enum, default_value_t = ColorMode::Energy)]
    pub color_mode: ColorMode,

    #[arg(long, value_enum, default_value_t = Density::Medium)]
    pub density: Density,

    /// Custom glyph ramp, densest first. Overrides --density.
    #[arg(long)]
    pub palette: Option<String>,

    /// Grid columns. Defaults to one glyph per terminal column.
    #[arg(long)]
    pub cols: Option<u16>,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    #[arg(long, default_value_t = 0x5eed)]
    pub seed: u64,

    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Still image sampled by grid mode instead of the synthetic audio field.
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Command script applied before the first frame.
    #[arg(long)]
    pub commands: Option<PathBuf>,

    /// Glyphs only, no color escapes.
    #[arg(long, default_value_t = false)]
    pub plain: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn render_config(&self, width: f32, height: f32) -> RenderConfig {
        RenderConfig {
            mode: self.mode,
            color_mode: self.color_mode,
            density: self.density,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioSource {
    Mic,
    #[value(alias = "demo", alias = "test")]
    Synth,
    #[value(alias = "none", alias = "idle")]
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum RenderMode {
    #[value(alias = "ascii")]
    Grid,
    #[value(alias = "wave", alias = "scope")]
    Waveform,
    #[value(alias = "radial", alias = "rings")]
    Circular,
    #[value(alias = "particle")]
    Particles,
    #[value(alias = "wireframe")]
    Mesh,
}

impl RenderMode {
    pub const fn all() -> [Self; 5] {
        [
            Self::Grid,
            Self::Waveform,
            Self::Circular,
            Self::Particles,
            Self::Mesh,
        ]
    }

    pub fn next(self) -> Self {
        match self {
            Self::Grid => Self::Waveform,
            Self::Waveform => Self::Circular,
            Self::Circular => Self::Particles,
            Self::Particles => Self::Mesh,
            Self::Mesh => Self::Grid,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Grid => Self::Mesh,
            Self::Waveform => Self::Grid,
            Self::Circular => Self::Waveform,
            Self::Particles => Self::Circular,
            Self::Mesh => Self::Particles,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::Waveform => "waveform",
            Self::Circular => "circular",
            Self::Particles => "particles",
            Self::Mesh => "mesh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    #[value(alias = "white")]
    Mono,
    #[value(alias = "rgb")]
    Color,
    Hue,
    #[value(alias = "boost")]
    Energy,
}

impl ColorMode {
    pub fn next(self) -> Self {
        match self {
            Self::Mono => Self::Color,
            Self::Color => Self::Hue,
            Self::Hue => Self::Energy,
            Self::Energy => Self::Mono,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Color => "color",
            Self::Hue => "hue",
            Self::Energy => "energy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Density {
    Low,
    Medium,
    High,
}

impl Density {
    pub fn next(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Runtime-replaceable settings exposed to the host UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub color_mode: ColorMode,
    pub density: Density,
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Grid,
            color_mode: ColorMode::Energy,
            density: Density::Medium,
            width: 640.0,
            height: 480.0,
        }
    }
}
