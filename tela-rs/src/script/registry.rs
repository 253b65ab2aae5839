//! Keyword → handler table driving command dispatch.
//!
//! A registry is built per interpreter, never shared between runs.  Adding a
//! command to the dialect is a matter of registering another handler.

use std::collections::HashMap;
use std::fmt;

use super::error::ScriptError;
use super::interp::Session;
use super::literal::BraceIndex;

/// What a handler gets to see of the script.
#[derive(Debug, Clone, Copy)]
pub struct CommandInput<'a> {
    /// The (trimmed) line being executed.
    pub line: &'a str,
    /// Every line of the script, for handlers that read ahead.
    pub lines: &'a [String],
    /// Where object literals opened on each line close.
    pub braces: &'a BraceIndex,
    /// Index of `line` within `lines`.
    pub index: usize,
}

/// A command handler.  Returns the number of lines consumed beyond
/// `input.line`, which the execution loop skips.
pub type Handler = Box<dyn Fn(&CommandInput<'_>, &mut Session<'_>) -> Result<usize, ScriptError>>;

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in `set` and `display` commands.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtins::register_builtins(&mut registry);
        registry
    }

    /// Register `handler` for `keyword`, replacing any previous handler.
    pub fn register<F>(&mut self, keyword: impl Into<String>, handler: F)
    where
        F: Fn(&CommandInput<'_>, &mut Session<'_>) -> Result<usize, ScriptError> + 'static,
    {
        self.commands.insert(keyword.into(), Box::new(handler));
    }

    pub fn get(&self, keyword: &str) -> Option<&Handler> {
        self.commands.get(keyword)
    }

    pub fn has(&self, keyword: &str) -> bool {
        self.commands.contains_key(keyword)
    }

    /// Registered keywords, sorted.
    pub fn keywords(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("keywords", &self.keywords())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
