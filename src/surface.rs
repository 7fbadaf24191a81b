use crate::color::Rgb;
use crate::mapping::constrain;

/// 2D drawing target. Coordinates are logical pixels, origin top-left, y down.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn resize(&mut self, w: f32, h: f32);
    fn clear(&mut self, bg: Rgb);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb);
    fn polyline(&mut self, points: &[(f32, f32)], color: Rgb);
    fn glyph(&mut self, x: f32, y: f32, size: f32, ch: char, color: Rgb);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl Cell {
    pub const BLANK: Self = Self {
        ch: ' ',
        fg: Rgb::MONO,
        bg: Rgb::BLACK,
    };
}

/// Glyphs smaller than this are not drawn.
pub const MIN_GLYPH_PX: f32 = 1.0;

/// Rasterizes draw calls onto a grid of terminal cells.
///
/// A terminal cell covers `px_per_col × px_per_row` logical pixels. Terminals cannot
/// scale text, so glyph size below a full cell height dims the foreground instead.
#[derive(Debug, Clone)]
pub struct CellCanvas {
    cols: usize,
    rows: usize,
    px_per_col: f32,
    px_per_row: f32,
    cells: Vec<Cell>,
}

impl CellCanvas {
    pub const PX_PER_COL: f32 = 8.0;
    pub const PX_PER_ROW: f32 = 16.0;

    pub fn new(cols: usize, rows: usize) -> Self {
        Self::with_cell_px(cols, rows, Self::PX_PER_COL, Self::PX_PER_ROW)
    }

    pub fn with_cell_px(cols: usize, rows: usize, px_per_col: f32, px_per_row: f32) -> Self {
        Self {
            cols,
            rows,
            px_per_col: px_per_col.max(1.0),
            px_per_row: px_per_row.max(1.0),
            cells: vec![Cell::BLANK; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn px_per_col(&self) -> f32 {
        self.px_per_col
    }

    pub fn px_per_row(&self) -> f32 {
        self.px_per_row
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }

    /// Resizes to a whole number of terminal cells; a no-op when nothing changes.
    pub fn resize_cells(&mut self, cols: usize, rows: usize) {
        if cols == self.cols && rows == self.rows {
            return;
        }
        self.cols = cols;
        self.rows = rows;
        self.cells = vec![Cell::BLANK; cols * rows];
    }

    /// Number of cells holding a visible glyph.
    pub fn glyph_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.ch.is_whitespace()).count()
    }

    pub fn to_text(&self) -> String {
        let mut s = String::with_capacity((self.cols + 1) * self.rows);
        for row in self.cells.chunks(self.cols.max(1)).take(self.rows) {
            s.extend(row.iter().map(|c| c.ch));
            s.push('\n');
        }
        s
    }

    fn cell_index(&self, x: f32, y: f32) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.px_per_col) as usize;
        let row = (y / self.px_per_row) as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        Some(row * self.cols + col)
    }

    fn col_span(&self, x0: f32, x1: f32) -> std::ops::Range<usize> {
        let a = constrain((x0 / self.px_per_col).floor(), 0.0, self.cols as f32) as usize;
        let b = constrain((x1 / self.px_per_col).ceil(), 0.0, self.cols as f32) as usize;
        a..b.max(a)
    }

    fn row_span(&self, y0: f32, y1: f32) -> std::ops::Range<usize> {
        let a = constrain((y0 / self.px_per_row).floor(), 0.0, self.rows as f32) as usize;
        let b = constrain((y1 / self.px_per_row).ceil(), 0.0, self.rows as f32) as usize;
        a..b.max(a)
    }

    fn plot(&mut self, col: i64, row: i64, ch: char, fg: Rgb) {
        if col < 0 || row < 0 || col as usize >= self.cols || row as usize >= self.rows {
            return;
        }
        let idx = row as usize * self.cols + col as usize;
        self.cells[idx].ch = ch;
        self.cells[idx].fg = fg;
    }
}

impl Surface for CellCanvas {
    fn width(&self) -> f32 {
        self.cols as f32 * self.px_per_col
    }

    fn height(&self) -> f32 {
        self.rows as f32 * self.px_per_row
    }

    fn resize(&mut self, w: f32, h: f32) {
        let cols = (w.max(0.0) / self.px_per_col).floor() as usize;
        let rows = (h.max(0.0) / self.px_per_row).floor() as usize;
        self.resize_cells(cols, rows);
    }

    fn clear(&mut self, bg: Rgb) {
        for c in &mut self.cells {
            *c = Cell {
                ch: ' ',
                fg: Rgb::MONO,
                bg,
            };
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        if !(w > 0.0 && h > 0.0) || !x.is_finite() || !y.is_finite() {
            return;
        }
        for row in self.row_span(y, y + h) {
            for col in self.col_span(x, x + w) {
                let c = &mut self.cells[row * self.cols + col];
                c.ch = ' ';
                c.bg = color;
            }
        }
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb) {
        if !(r > 0.0) || !cx.is_finite() || !cy.is_finite() {
            return;
        }
        // Sub-cell dots become a single glyph.
        if r * 2.0 < self.px_per_col.min(self.px_per_row) {
            if let Some(idx) = self.cell_index(cx, cy) {
                self.cells[idx].ch = '•';
                self.cells[idx].fg = color;
            }
            return;
        }
        let r2 = r * r;
        for row in self.row_span(cy - r, cy + r) {
            for col in self.col_span(cx - r, cx + r) {
                let px = (col as f32 + 0.5) * self.px_per_col - cx;
                let py = (row as f32 + 0.5) * self.px_per_row - cy;
                if px * px + py * py <= r2 {
                    let c = &mut self.cells[row * self.cols + col];
                    c.ch = ' ';
                    c.bg = color;
                }
            }
        }
    }

    fn polyline(&mut self, points: &[(f32, f32)], color: Rgb) {
        for seg in points.windows(2) {
            let (x0, y0) = seg[0];
            let (x1, y1) = seg[1];
            if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
                continue;
            }
            let ch = line_glyph(x1 - x0, y1 - y0, self.px_per_col, self.px_per_row);

            let mut c0 = (x0 / self.px_per_col).floor() as i64;
            let mut r0 = (y0 / self.px_per_row).floor() as i64;
            let c1 = (x1 / self.px_per_col).floor() as i64;
            let r1 = (y1 / self.px_per_row).floor() as i64;

            let dc = (c1 - c0).abs();
            let dr = -(r1 - r0).abs();
            let sc = if c0 < c1 { 1 } else { -1 };
            let sr = if r0 < r1 { 1 } else { -1 };
            let mut err = dc + dr;
            // Segments far outside the canvas still terminate: the walk is bounded.
            let max_steps = (dc - dr + 1) as usize;
            for _ in 0..max_steps {
                self.plot(c0, r0, ch, color);
                if c0 == c1 && r0 == r1 {
                    break;
                }
                let e2 = 2 * err;
                if e2 >= dr {
                    err += dr;
                    c0 += sc;
                }
                if e2 <= dc {
                    err += dc;
                    r0 += sr;
                }
            }
        }
    }

    fn glyph(&mut self, x: f32, y: f32, size: f32, ch: char, color: Rgb) {
        if !(size >= MIN_GLYPH_PX) || ch.is_whitespace() {
            return;
        }
        let Some(idx) = self.cell_index(x, y) else {
            return;
        };
        let k = constrain(size / self.px_per_row, 0.35, 1.0);
        self.cells[idx].ch = ch;
        self.cells[idx].fg = color.scaled(k);
    }
}

fn line_glyph(dx: f32, dy: f32, px_per_col: f32, px_per_row: f32) -> char {
    // Compare slopes in cell units so a 45° cell diagonal maps to a slash.
    let cx = dx / px_per_col;
    let cy = dy / px_per_row;
    if cx.abs() >= cy.abs() * 2.0 {
        '-'
    } else if cy.abs() >= cx.abs() * 2.0 {
        '|'
    } else if (cx > 0.0) == (cy < 0.0) {
        '/'
    } else {
        '\\'
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Rgb),
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    Circle {
        cx: f32,
        cy: f32,
        r: f32,
        color: Rgb,
    },
    Polyline {
        points: Vec<(f32, f32)>,
        color: Rgb,
    },
    Glyph {
        x: f32,
        y: f32,
        size: f32,
        ch: char,
        color: Rgb,
    },
}

/// Keeps every draw call for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub commands: Vec<DrawCmd>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn glyphs(&self) -> impl Iterator<Item = (f32, f32, f32, char, Rgb)> + '_ {
        self.commands.iter().filter_map(|c| match *c {
            DrawCmd::Glyph {
                x,
                y,
                size,
                ch,
                color,
            } => Some((x, y, size, ch, color)),
            _ => None,
        })
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs().count()
    }

    pub fn polyline_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Polyline { .. }))
            .count()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn resize(&mut self, w: f32, h: f32) {
        self.width = w;
        self.height = h;
    }

    fn clear(&mut self, bg: Rgb) {
        self.commands.clear();
        self.commands.push(DrawCmd::Clear(bg));
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.commands.push(DrawCmd::Rect { x, y, w, h, color });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Rgb) {
        self.commands.push(DrawCmd::Circle { cx, cy, r, color });
    }

    fn polyline(&mut self, points: &[(f32, f32)], color: Rgb) {
        self.commands.push(DrawCmd::Polyline {
            points: points.to_vec(),
            color,
        });
    }

    fn glyph(&mut self, x: f32, y: f32, size: f32, ch: char, color: Rgb) {
        self.commands.push(DrawCmd::Glyph {
            x,
            y,
            size,
            ch,
            color,
        });
    }
}
