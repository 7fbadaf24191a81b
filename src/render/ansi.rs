use crate::color::Rgb;
use crate::render::{Frame, Presenter, begin_frame, end_frame};
use std::io::Write;

/// 24-bit color presenter; only emits an SGR escape when the color actually changes.
pub struct AnsiPresenter {
    last_fg: Option<Rgb>,
    last_bg: Option<Rgb>,
}

impl AnsiPresenter {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for AnsiPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for AnsiPresenter {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn present(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = (frame.term_cols as usize).min(frame.canvas.cols());
        let rows = frame.visual_rows();
        if cols == 0 || rows == 0 {
            return Ok(());
        }

        begin_frame(frame, out)?;
        // The terminal state was reset above, so the cache must be too.
        self.last_fg = None;
        self.last_bg = None;

        let mut buf = [0u8; 4];
        for row in 0..rows {
            write!(out, "\x1b[{};1H", row + 1)?;
            for col in 0..cols {
                let Some(cell) = frame.canvas.cell(col, row) else {
                    continue;
                };
                if self.last_bg != Some(cell.bg) {
                    write!(out, "\x1b[48;2;{};{};{}m", cell.bg.r, cell.bg.g, cell.bg.b)?;
                    self.last_bg = Some(cell.bg);
                }
                if !cell.ch.is_whitespace() && self.last_fg != Some(cell.fg) {
                    write!(out, "\x1b[38;2;{};{};{}m", cell.fg.r, cell.fg.g, cell.fg.b)?;
                    self.last_fg = Some(cell.fg);
                }
                out.write_all(cell.ch.encode_utf8(&mut buf).as_bytes())?;
            }
        }

        end_frame(frame, out)
    }
}
