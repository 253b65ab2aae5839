//! The tela scripting dialect.
//!
//! A script is a sequence of lines, each either a `set` or a `display`
//! command:
//!
//! - `set name = value` binds a number, boolean, string, another variable's
//!   value, or a flat object literal (`{ key: value, … }`, which may span
//!   several lines)
//! - `display(expr)` evaluates an arithmetic/boolean expression and draws the
//!   result as the next line of text
//!
//! Lines are executed in order and each one fails on its own: an error is
//! drawn in red where its output would have gone, and the next line runs.
//!
//! # Quick start
//!
//! ```rust
//! use tela::script::Interpreter;
//! use tela::surface::RecordingSurface;
//!
//! let mut surface = RecordingSurface::new();
//! Interpreter::new(&mut surface).run("set x = 6\ndisplay(x * 7)");
//! assert_eq!(surface.texts(), vec!["42"]);
//! ```

pub mod builtins;
pub mod error;
pub mod expr;
pub mod interp;
pub mod literal;
pub mod registry;
pub mod value;

// Re-exports for convenience.
pub use error::{EvalError, ScriptError};
pub use interp::{interpret, Interpreter, RunReport, Session};
pub use registry::{CommandInput, CommandRegistry};
pub use value::{FlatObject, Value, VarStore};
