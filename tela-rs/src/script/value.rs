//! Runtime value type and variable store for the tela dialect.
//!
//! Values are immutable once bound: `set` replaces a binding, and copying a
//! variable (into another binding or an object entry) takes a snapshot.

use std::collections::HashMap;
use std::fmt;

/// A one-level mapping of string keys to scalar values.
///
/// Entries keep their insertion order so that rendering an object is
/// deterministic.  Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatObject {
    entries: Vec<(String, Value)>,
}

impl FlatObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scalar entry.  Returns `false` (and leaves the object
    /// unchanged) when `value` is itself an object.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> bool {
        if !value.is_scalar() {
            return false;
        }
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for FlatObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        f.write_str("}")
    }
}

/// A tela runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    String(String),
    Object(FlatObject),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => fmt_number(*x, f),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::String(s) => f.write_str(s),
            Value::Object(o) => write!(f, "{o}"),
        }
    }
}

/// Numbers print the way the dialect always has: shortest round-trip
/// digits, integral values without a fractional part, non-finite values
/// spelled out, and exponent form (`1e+21`, `1.5e-7`) outside
/// `[1e-6, 1e21)`.
fn fmt_number(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        f.write_str("NaN")
    } else if x.is_infinite() {
        f.write_str(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else if x == 0.0 {
        // -0 prints as 0
        f.write_str("0")
    } else if x.abs() >= 1e21 || x.abs() < 1e-6 {
        let sci = format!("{x:e}");
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => write!(f, "{mantissa}e+{exp}"),
            _ => f.write_str(&sci),
        }
    } else {
        write!(f, "{x}")
    }
}

impl Value {
    /// `true` for every variant except [`Value::Object`].
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::Object(_))
    }

    /// Name of the type, used in evaluator diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<FlatObject> for Value {
    fn from(o: FlatObject) -> Self {
        Value::Object(o)
    }
}

// ── VarStore ──────────────────────────────────────────────────────────────────

/// Identifier → value bindings for one interpreter invocation.
#[derive(Debug, Default)]
pub struct VarStore {
    vars: HashMap<String, Value>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind (or rebind) a variable.  No type check against a previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
