mod ansi;
mod plain;

pub use ansi::AnsiPresenter;
pub use plain::PlainPresenter;

use crate::surface::CellCanvas;
use std::io::Write;

/// One terminal frame: the rasterized canvas plus the HUD rows below it.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub canvas: &'a CellCanvas,
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

impl Frame<'_> {
    pub fn visual_rows(&self) -> usize {
        (self.term_rows.saturating_sub(self.hud_rows) as usize).min(self.canvas.rows())
    }
}

/// Writes a [`Frame`] to a terminal byte stream.
pub trait Presenter {
    fn name(&self) -> &'static str;
    fn present(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

pub(crate) fn begin_frame(frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    // Home, reset, autowrap off so a full-width row never scrolls.
    out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
    Ok(())
}

pub(crate) fn end_frame(frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
    let cols = frame.term_cols as usize;
    let visual_rows = frame.visual_rows();
    let mut hud_lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
        if let Some(line) = hud_lines.next() {
            let clipped = line.chars().take(cols).collect::<String>();
            out.write_all(clipped.as_bytes())?;
        }
    }

    if let Some(text) = frame.overlay {
        draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
    }

    out.write_all(b"\x1b[?7h\x1b[0m")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner_w = cols.saturating_sub(6).max(1);
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let chars = raw.chars().collect::<Vec<_>>();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(chars.chunks(max_inner_w).map(|c| c.iter().collect::<String>()));
    }

    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(1, max_inner_w);
    let box_w = (inner_w + 4).min(cols.saturating_sub(2)).max(4);
    let inner_w = box_w.saturating_sub(4);
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = (body_h + 2).min(rows.saturating_sub(1)).max(3);

    let start_col = cols.saturating_sub(box_w) / 2 + 1;
    let start_row = rows.saturating_sub(box_h) / 2 + 1;
    let horiz = "-".repeat(box_w.saturating_sub(2));
    let blank = " ".repeat(inner_w);

    out.write_all(b"\x1b[0m\x1b[38;2;236;242;255m\x1b[48;2;10;14;24m")?;
    write!(out, "\x1b[{};{}H+{}+", start_row, start_col, horiz)?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        write!(out, "\x1b[{};{}H| {} |", row, start_col, blank)?;
        if i == 0 {
            // Title line.
            write!(
                out,
                "\x1b[{};{}H\x1b[1m\x1b[38;2;255;236;160m{}\x1b[22m\x1b[38;2;236;242;255m",
                row,
                start_col + 2,
                line
            )?;
        } else {
            write!(out, "\x1b[{};{}H{}", row, start_col + 2, line)?;
        }
    }
    write!(out, "\x1b[{};{}H+{}+", start_row + box_h - 1, start_col, horiz)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
