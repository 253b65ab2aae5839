//! Text colors handed to a [`Surface`](crate::surface::Surface).
//!
//! The interpreter itself only ever uses two colors: [`Color::TEXT`] for
//! `display` output and [`Color::ERROR`] for `Erro: …` lines.  Surfaces are
//! free to map them however suits the medium.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Error returned when a color string is not `#RRGGBB` / `#RGB`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}' (expected #RRGGBB or #RGB)")]
pub struct ColorParseError(pub String);

impl Color {
    /// Default text color (`#000000`).
    pub const TEXT: Self = Self::rgb(0x00, 0x00, 0x00);
    /// Error text color (`#FF0000`).
    pub const ERROR: Self = Self::rgb(0xff, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parse `#RRGGBB` or the short `#RGB` form (the `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_owned());
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize, w: usize| u8::from_str_radix(&hex[i..i + w], 16).map_err(|_| err());
        match hex.len() {
            6 => Ok(Self::rgb(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            3 => {
                // #abc → #aabbcc
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Ok(Self::rgb(r * 17, g * 17, b * 17))
            }
            _ => Err(err()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
