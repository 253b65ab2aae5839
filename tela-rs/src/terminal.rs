//! Terminal rendering: a crossterm-backed [`Surface`].
//!
//! Pixel positions from the interpreter are mapped onto character cells
//! (`cell_width` pixels per column, `line_height` pixels per row, with the
//! first baseline on row 0).  The two interpreter colors are mapped through
//! a [`Palette`] so that black text stays readable on dark terminals.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::color::Color;
use crate::config::Config;
use crate::surface::Surface;

// ── Color mapping ─────────────────────────────────────────────────────────────

/// Terminal colors used for the interpreter's text and error colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: TermColor,
    pub error: TermColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            text: TermColor::Reset,
            error: TermColor::Red,
        }
    }
}

impl Palette {
    /// Build a palette from the `text_color` / `error_color` settings.
    pub fn from_config(config: &Config) -> Self {
        let default = Self::default();
        Self {
            text: config.text_color.map(rgb).unwrap_or(default.text),
            error: config.error_color.map(rgb).unwrap_or(default.error),
        }
    }

    /// Map an interpreter color to a terminal color.
    pub fn map(&self, color: Color) -> TermColor {
        if color == Color::TEXT {
            self.text
        } else if color == Color::ERROR {
            self.error
        } else {
            rgb(color)
        }
    }
}

fn rgb(c: Color) -> TermColor {
    TermColor::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

// ── TerminalSurface ───────────────────────────────────────────────────────────

/// Draws text at absolute cell positions on a cleared screen.
///
/// The screen is cleared on the first draw.  On drop (or an explicit
/// [`TerminalSurface::finish`]) the cursor is parked below the lowest row
/// drawn and output is flushed; a surface that never drew writes nothing.
pub struct TerminalSurface {
    cell_width: f64,
    line_height: f64,
    palette: Palette,
    /// Lowest row written so far; `None` until the first draw.
    last_row: Option<u16>,
    out: Box<dyn Write>,
}

impl TerminalSurface {
    /// Create a surface writing to `out`, with geometry and palette from
    /// `config`.
    pub fn new(out: impl Write + 'static, config: &Config) -> Self {
        Self {
            cell_width: config.cell_width,
            line_height: config.line_height,
            palette: Palette::from_config(config),
            last_row: None,
            out: Box::new(out),
        }
    }

    /// Clear the screen and home the cursor.
    fn begin(&mut self) -> io::Result<()> {
        queue!(
            self.out,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        self.out.flush()
    }

    /// Cell `(col, row)` for the pixel position `(x, y)`.
    pub fn cell_for(&self, x: f64, y: f64) -> (u16, u16) {
        let col = (x / self.cell_width).floor().max(0.0) as u16;
        let row = ((y / self.line_height).round() - 1.0).max(0.0) as u16;
        (col, row)
    }

    /// Move the cursor below the last drawn row and flush.
    pub fn finish(&mut self) -> io::Result<()> {
        let Some(last) = self.last_row else {
            return Ok(());
        };
        queue!(self.out, cursor::MoveTo(0, last.saturating_add(1)), Print("\n"))?;
        self.out.flush()
    }

    fn try_draw(&mut self, text: &str, col: u16, row: u16, color: TermColor) -> io::Result<()> {
        queue!(
            self.out,
            cursor::MoveTo(col, row),
            SetForegroundColor(color),
            Print(text),
            ResetColor
        )?;
        self.out.flush()
    }
}

impl Surface for TerminalSurface {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        let (col, row) = self.cell_for(x, y);
        let term_color = self.palette.map(color);
        let result = match self.last_row {
            None => self.begin(),
            Some(_) => Ok(()),
        };
        // terminal writes are best-effort
        if let Err(e) = result.and_then(|_| self.try_draw(text, col, row, term_color)) {
            tracing::warn!(error = %e, "terminal write failed");
        }
        self.last_row = Some(self.last_row.map_or(row, |r| r.max(row)));
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::warn!(error = %e, "terminal flush failed");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
