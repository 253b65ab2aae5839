//! tela: a line-oriented `set`/`display` script interpreter that renders its
//! output as text on a drawing surface.

pub mod cli;
pub mod color;
pub mod config;
pub mod script;
pub mod surface;
pub mod terminal;
