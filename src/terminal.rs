use anyhow::Context;
use crossterm::{
    cursor, execute,
    terminal::{self, ClearType},
};
use std::io::{Stdout, Write, stdout};
use tracing::debug;

/// Modes a presenter may leave on mid-frame: synchronized output, no autowrap, colors.
const RESET_PRESENTER_MODES: &[u8] = b"\x1b[?2026l\x1b[?7h\x1b[0m";

/// Owns the terminal while the visualizer runs: raw input, alternate screen and a
/// hidden cursor. Everything is undone on drop.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        let guard = Self { _private: () };

        // An error past raw mode still drops `guard` and restores the terminal.
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )
        .context("prepare alternate screen")?;
        debug!("terminal taken over");

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }

    /// Terminal size in cells, falling back to 80x24 when the query fails.
    pub fn size() -> (u16, u16) {
        terminal::size().unwrap_or((80, 24))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        let _ = out.write_all(RESET_PRESENTER_MODES);
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        debug!("terminal restored");
    }
}
