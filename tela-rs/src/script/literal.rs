//! Value-literal grammar: scalars, flat object literals and the multi-line
//! object aggregator.
//!
//! A value expression is resolved by trying, in order:
//!
//! 1. object literal (`{ key: value, … }`, possibly spanning lines)
//! 2. single- or double-quoted string (quotes stripped, no escapes)
//! 3. `true` / `false`
//! 4. a signed integer or decimal number
//! 5. the name of a bound variable (snapshot of its current value)
//!
//! Anything else is [`ScriptError::InvalidValue`].

use std::sync::OnceLock;

use regex::Regex;

use super::error::ScriptError;
use super::value::{FlatObject, Value, VarStore};

// ── Multi-line aggregation ────────────────────────────────────────────────────

/// An object literal gathered from one or more physical lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregated {
    /// The literal text, continuation lines joined with a single space.
    pub text: String,
    /// Number of lines consumed after the line the literal started on.
    pub consumed: usize,
}

/// Net brace balance of one physical line.
fn brace_delta(s: &str) -> i64 {
    s.chars().fold(0, |d, c| match c {
        '{' => d + 1,
        '}' => d - 1,
        _ => d,
    })
}

/// Where each line's object literal would close.
///
/// `close[i]` is the first line after `i` at which a depth of 1 opened on
/// line `i` drops to zero or below.  Built once per script with a monotonic
/// stack over the running brace balance, so an unclosed literal costs O(1)
/// to reject instead of a rescan of the rest of the script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BraceIndex {
    /// Running brace balance through each line.
    balance: Vec<i64>,
    close: Vec<Option<usize>>,
}

impl BraceIndex {
    pub fn new(lines: &[String]) -> Self {
        let balance: Vec<i64> = lines
            .iter()
            .scan(0, |acc, l| {
                *acc += brace_delta(l);
                Some(*acc)
            })
            .collect();

        let mut close = vec![None; lines.len()];
        let mut stack: Vec<usize> = Vec::new();
        for i in (0..lines.len()).rev() {
            while stack.last().is_some_and(|&k| balance[k] >= balance[i]) {
                stack.pop();
            }
            close[i] = stack.last().copied();
            stack.push(i);
        }

        Self { balance, close }
    }

    /// The closing line for a literal opened on `index`, with the depth
    /// reached there (0 when balanced, negative when overshot).
    pub fn closing(&self, index: usize) -> Option<(usize, i64)> {
        let k = (*self.close.get(index)?)?;
        Some((k, 1 + self.balance[k] - self.balance[index]))
    }
}

/// Collect an object literal that starts with `value` on `lines[index]`.
///
/// A value already ending in `}` is taken as is.  Otherwise depth starts at
/// 1 and following lines are appended until the braces they carry bring it
/// back to zero.  Fails with [`ScriptError::MalformedObjectLiteral`]
/// (naming `line`) when the stream runs out first or the depth overshoots.
pub fn aggregate_object(
    value: &str,
    line: &str,
    lines: &[String],
    braces: &BraceIndex,
    index: usize,
) -> Result<Aggregated, ScriptError> {
    let malformed = || ScriptError::MalformedObjectLiteral(line.to_owned());

    if value.ends_with('}') {
        return Ok(Aggregated {
            text: value.to_owned(),
            consumed: 0,
        });
    }

    let (last, depth) = braces.closing(index).ok_or_else(malformed)?;
    if depth != 0 {
        return Err(malformed());
    }

    let tail = lines.get(index + 1..=last).ok_or_else(malformed)?;
    let mut text = value.to_owned();
    for next in tail {
        text.push(' ');
        text.push_str(next);
    }

    Ok(Aggregated {
        text,
        consumed: last - index,
    })
}

// ── Value parsing ─────────────────────────────────────────────────────────────

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("number literal regex")
    })
}

/// Strip one pair of matching outer quotes.
fn unquote(text: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        text.strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

/// Grammar steps 2–5.  Returns `None` when nothing matches.
fn parse_atom(text: &str, vars: &VarStore) -> Option<Value> {
    if text.len() >= 2 {
        if let Some(inner) = unquote(text) {
            return Some(Value::String(inner.to_owned()));
        }
    }
    match text {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        _ => {}
    }
    if number_re().is_match(text) {
        if let Ok(x) = text.parse::<f64>() {
            return Some(Value::Number(x));
        }
    }
    vars.get(text).cloned()
}

/// Resolve a trimmed value expression to a [`Value`].
///
/// `text` must already be a complete literal; multi-line objects go through
/// [`aggregate_object`] first.  `line` is the source line quoted in errors.
pub fn parse_value(text: &str, vars: &VarStore, line: &str) -> Result<Value, ScriptError> {
    if text.starts_with('{') {
        return parse_object(text, vars, line).map(Value::Object);
    }
    parse_atom(text, vars).ok_or_else(|| ScriptError::InvalidValue(line.to_owned()))
}

/// Parse `{ key: value, … }` into a [`FlatObject`].
///
/// Entries are split on `,` and empty entries are skipped.  Each entry splits
/// at its first `:`; keys and values are trimmed and must be non-empty.
/// Values must resolve to scalars.
pub fn parse_object(text: &str, vars: &VarStore, line: &str) -> Result<FlatObject, ScriptError> {
    let (Some(open), Some(close)) = (text.find('{'), text.rfind('}')) else {
        return Err(ScriptError::MalformedObjectLiteral(line.to_owned()));
    };
    if close < open {
        return Err(ScriptError::MalformedObjectLiteral(line.to_owned()));
    }

    let mut obj = FlatObject::new();
    let body = text[open + 1..close].trim();

    for pair in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let bad_pair = || ScriptError::InvalidKeyValuePair(pair.to_owned());
        let (key, val) = pair.split_once(':').ok_or_else(bad_pair)?;
        let (key, val) = (key.trim(), val.trim());
        if key.is_empty() || val.is_empty() {
            return Err(bad_pair());
        }

        // nested objects are not part of the grammar
        let value = if val.starts_with('{') {
            None
        } else {
            parse_atom(val, vars).filter(Value::is_scalar)
        };
        let value = value.ok_or_else(|| ScriptError::InvalidValue(line.to_owned()))?;
        obj.insert(key, value);
    }

    Ok(obj)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
