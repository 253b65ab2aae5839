//! `.telarc` configuration file parser.
//!
//! The rc file uses the dialect's own `set` syntax, one setting per line:
//!
//! | Setting | Meaning | Default |
//! |---------|---------|---------|
//! | `surface` | target id the script is drawn on | `main` |
//! | `cell_width` | pixels per terminal column | `10` |
//! | `line_height` | pixels per terminal row | `20` |
//! | `text_color` | terminal color for normal output (`#RRGGBB`) | terminal default |
//! | `error_color` | terminal color for error lines (`#RRGGBB`) | red |
//!
//! Both `set name = value` and `set name value` are accepted; values may be
//! double-quoted.  Lines starting with `;` are comments.

use std::path::Path;

use thiserror::Error;

use crate::color::Color;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Rendering settings for the `tela` binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub surface: String,
    pub cell_width: f64,
    pub line_height: f64,
    pub text_color: Option<Color>,
    pub error_color: Option<Color>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            surface: "main".to_owned(),
            cell_width: 10.0,
            line_height: 20.0,
            text_color: None,
            error_color: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an rc string.
    ///
    /// Bad lines are reported and skipped; the rest of the file still
    /// applies.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let Some(args) = line.strip_prefix("set ") else {
                errors.push(ConfigError {
                    line: lineno,
                    message: format!("expected 'set', found: {line}"),
                });
                continue;
            };

            let result = split_setting(args).and_then(|(name, value)| config.apply(name, &value));
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse an rc file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Apply one `name = value` setting.
    pub fn apply(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "surface" => {
                if value.is_empty() {
                    return Err("surface: empty target id".into());
                }
                self.surface = value.to_owned();
            }
            "cell_width" => self.cell_width = parse_pixels(name, value)?,
            "line_height" => self.line_height = parse_pixels(name, value)?,
            "text_color" => self.text_color = parse_color(value)?,
            "error_color" => self.error_color = parse_color(value)?,
            _ => return Err(format!("unknown setting '{name}'")),
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Split `name=value` / `name = value` / `name value`, unquoting the value.
fn split_setting(args: &str) -> Result<(&str, String), String> {
    let args = args.trim();
    let (name, rest) = match args.split_once('=') {
        Some((n, r)) => (n.trim(), r.trim()),
        None => args
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((args, "")),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("invalid setting name '{name}'"));
    }
    let value = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .unwrap_or(rest);
    Ok((name, value.to_owned()))
}

fn parse_pixels(name: &str, value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(x) if x.is_finite() && x > 0.0 => Ok(x),
        _ => Err(format!("{name}: expected a positive number, found '{value}'")),
    }
}

/// `default` (or `none`) clears an override.
fn parse_color(value: &str) -> Result<Option<Color>, String> {
    match value {
        "default" | "none" => Ok(None),
        _ => value.parse().map(Some).map_err(|e: crate::color::ColorParseError| e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
