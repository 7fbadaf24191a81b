//! Restricted command language driving a [`Visualizer`].
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! mode circular
//! color hue
//! density high
//! size 960 540
//! smoothing bass 0.5
//! multiplier treble 2400
//! range mid 300 2500
//! stop
//! play
//! ```

use crate::config::{ColorMode, Density, RenderMode};
use crate::signal::Band;
use crate::visual::Visualizer;
use clap::ValueEnum;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Mode(RenderMode),
    Color(ColorMode),
    Density(Density),
    Size { width: f32, height: f32 },
    Play,
    Stop,
    Smoothing { band: Band, factor: f32 },
    Multiplier { band: Band, value: f32 },
    Range { band: Band, min_hz: f32, max_hz: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("line {line}: unknown command '{word}'")]
    UnknownCommand { line: usize, word: String },
    #[error("line {line}: {message}")]
    InvalidArgument { line: usize, message: String },
}

impl Command {
    /// Parses one non-empty, comment-free line.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        parse_line(text, 1)
    }
}

/// Parses a whole script; blank lines and comments are skipped.
pub fn parse_script(text: &str) -> Result<Vec<Command>, CommandError> {
    let mut out = Vec::new();
    for (line_idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        out.push(parse_line(line, line_idx + 1)?);
    }
    Ok(out)
}

fn parse_line(text: &str, line: usize) -> Result<Command, CommandError> {
    let mut words = text.split_whitespace();
    let Some(head) = words.next() else {
        return Err(invalid(line, "empty command"));
    };
    let args = words.collect::<Vec<_>>();
    let head = head.to_ascii_lowercase();

    let cmd = match head.as_str() {
        "mode" => Command::Mode(parse_enum(&args, line, "mode")?),
        "color" | "colour" => Command::Color(parse_enum(&args, line, "color")?),
        "density" => Command::Density(parse_enum(&args, line, "density")?),
        "size" => {
            expect_args(&args, 2, line, "size <width> <height>")?;
            let width = parse_f32(args[0], line, "width")?;
            let height = parse_f32(args[1], line, "height")?;
            if !(width > 0.0 && height > 0.0) {
                return Err(invalid(line, "size must be positive"));
            }
            Command::Size { width, height }
        }
        "play" | "start" => {
            expect_args(&args, 0, line, "play")?;
            Command::Play
        }
        "stop" | "pause" => {
            expect_args(&args, 0, line, "stop")?;
            Command::Stop
        }
        "smoothing" => {
            expect_args(&args, 2, line, "smoothing <band> <factor>")?;
            let band = parse_band(args[0], line)?;
            let factor = parse_f32(args[1], line, "factor")?;
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(invalid(line, "smoothing factor must be in (0, 1]"));
            }
            Command::Smoothing { band, factor }
        }
        "multiplier" => {
            expect_args(&args, 2, line, "multiplier <band> <value>")?;
            let band = spectral_band(args[0], line)?;
            let value = parse_f32(args[1], line, "multiplier")?;
            if !(value >= 0.0) {
                return Err(invalid(line, "multiplier must be >= 0"));
            }
            Command::Multiplier { band, value }
        }
        "range" => {
            expect_args(&args, 3, line, "range <band> <min_hz> <max_hz>")?;
            let band = spectral_band(args[0], line)?;
            let min_hz = parse_f32(args[1], line, "min_hz")?;
            let max_hz = parse_f32(args[2], line, "max_hz")?;
            if !(min_hz >= 0.0 && min_hz < max_hz) {
                return Err(invalid(line, "range needs 0 <= min_hz < max_hz"));
            }
            Command::Range {
                band,
                min_hz,
                max_hz,
            }
        }
        _ => {
            return Err(CommandError::UnknownCommand { line, word: head });
        }
    };
    Ok(cmd)
}

fn invalid(line: usize, message: impl Into<String>) -> CommandError {
    CommandError::InvalidArgument {
        line,
        message: message.into(),
    }
}

fn expect_args(args: &[&str], n: usize, line: usize, usage: &str) -> Result<(), CommandError> {
    if args.len() != n {
        return Err(invalid(line, format!("usage: {usage}")));
    }
    Ok(())
}

fn parse_enum<T: ValueEnum>(args: &[&str], line: usize, what: &str) -> Result<T, CommandError> {
    expect_args(args, 1, line, &format!("{what} <value>"))?;
    T::from_str(args[0], true).map_err(|_| invalid(line, format!("unknown {what} '{}'", args[0])))
}

fn parse_f32(raw: &str, line: usize, what: &str) -> Result<f32, CommandError> {
    let v = raw
        .parse::<f32>()
        .map_err(|_| invalid(line, format!("{what} must be a number, got '{raw}'")))?;
    if !v.is_finite() {
        return Err(invalid(line, format!("{what} must be finite")));
    }
    Ok(v)
}

fn parse_band(raw: &str, line: usize) -> Result<Band, CommandError> {
    Band::parse(raw).ok_or_else(|| invalid(line, format!("unknown band '{raw}'")))
}

fn spectral_band(raw: &str, line: usize) -> Result<Band, CommandError> {
    match parse_band(raw, line)? {
        Band::Volume => Err(invalid(line, "volume has no frequency range")),
        band => Ok(band),
    }
}

impl Visualizer {
    pub fn apply(&mut self, cmd: &Command) {
        match *cmd {
            Command::Mode(m) => self.set_mode(m),
            Command::Color(c) => self.set_color_mode(c),
            Command::Density(d) => self.set_density(d),
            Command::Size { width, height } => {
                self.resize(width, height);
            }
            Command::Play => self.start(),
            Command::Stop => self.stop(),
            Command::Smoothing { band, factor } => {
                *self.smoothing_mut().get_mut(band) = factor;
            }
            Command::Multiplier { band, value } => {
                if let Some(range) = self.tuning_mut().get_mut(band) {
                    range.multiplier = value;
                }
            }
            Command::Range {
                band,
                min_hz,
                max_hz,
            } => {
                if let Some(range) = self.tuning_mut().get_mut(band) {
                    range.min_hz = min_hz;
                    range.max_hz = max_hz;
                }
            }
        }
    }
}
