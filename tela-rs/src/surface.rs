//! The drawing capability the interpreter renders onto.
//!
//! A [`Surface`] only needs to place a string of text at a pixel position in
//! a given color.  Surfaces are looked up by target id through a
//! [`SurfaceProvider`] at the start of each run; a missing target is the one
//! fatal error of the interpreter.

use std::collections::HashMap;
use std::io::Write;

use crate::color::Color;

/// Something text can be drawn on.
pub trait Surface {
    /// Draw `text` with its baseline-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color);
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        (**self).draw_text(text, x, y, color)
    }
}

/// Resolves a surface target id to a surface.
pub trait SurfaceProvider {
    fn surface(&mut self, target: &str) -> Option<&mut dyn Surface>;
}

// ── RecordingSurface ──────────────────────────────────────────────────────────

/// One `draw_text` call as seen by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

impl std::fmt::Display for DrawCall {
    /// Tab-separated `x y color text`, the `--dump` output format.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}\t{}", self.x, self.y, self.color, self.text)
    }
}

/// A surface that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Just the rendered strings, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.text.as_str()).collect()
    }

    /// Drain and return the recorded calls.
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for RecordingSurface {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        self.calls.push(DrawCall {
            text: text.to_owned(),
            x,
            y,
            color,
        });
    }
}

// ── WriteSurface ──────────────────────────────────────────────────────────────

/// Streams each draw call as one [`DrawCall`] line to a writer.
pub struct WriteSurface<W: Write> {
    out: W,
}

impl<W: Write> WriteSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Surface for WriteSurface<W> {
    fn draw_text(&mut self, text: &str, x: f64, y: f64, color: Color) {
        let call = DrawCall {
            text: text.to_owned(),
            x,
            y,
            color,
        };
        if let Err(e) = writeln!(self.out, "{call}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "dump write failed");
        }
    }
}

// ── Surfaces ──────────────────────────────────────────────────────────────────

/// A set of surfaces keyed by target id.
pub struct Surfaces<S: Surface = Box<dyn Surface>> {
    targets: HashMap<String, S>,
}

impl<S: Surface> Default for Surfaces<S> {
    fn default() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }
}

impl<S: Surface> Surfaces<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the surface for `target`.
    pub fn insert(&mut self, target: impl Into<String>, surface: S) {
        self.targets.insert(target.into(), surface);
    }

    pub fn get(&self, target: &str) -> Option<&S> {
        self.targets.get(target)
    }

    pub fn get_mut(&mut self, target: &str) -> Option<&mut S> {
        self.targets.get_mut(target)
    }

    pub fn remove(&mut self, target: &str) -> Option<S> {
        self.targets.remove(target)
    }
}

impl<S: Surface> SurfaceProvider for Surfaces<S> {
    fn surface(&mut self, target: &str) -> Option<&mut dyn Surface> {
        self.targets.get_mut(target).map(|s| s as &mut dyn Surface)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
