use crate::render::{Frame, Presenter, begin_frame, end_frame};
use std::io::Write;

/// Glyphs only. For terminals without truecolor, or piping into files.
pub struct PlainPresenter;

impl PlainPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for PlainPresenter {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn present(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = (frame.term_cols as usize).min(frame.canvas.cols());
        let rows = frame.visual_rows();
        if cols == 0 || rows == 0 {
            return Ok(());
        }

        begin_frame(frame, out)?;
        let mut line = String::with_capacity(cols * 3);
        for row in 0..rows {
            line.clear();
            line.extend((0..cols).filter_map(|col| frame.canvas.cell(col, row)).map(|c| c.ch));
            write!(out, "\x1b[{};1H{}", row + 1, line)?;
        }
        end_frame(frame, out)
    }
}
