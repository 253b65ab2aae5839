//! Built-in commands: `set` and `display`.

use std::sync::OnceLock;

use regex::Regex;

use crate::color::Color;

use super::error::ScriptError;
use super::expr::eval_str;
use super::literal::{aggregate_object, parse_value};
use super::registry::{CommandInput, CommandRegistry};
use super::interp::Session;

fn set_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^set\s+([A-Za-z0-9_]+)\s*=\s*(.+)$").expect("set regex"))
}

fn display_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^display\((.*)\)$").expect("display regex"))
}

/// Register every built-in command.
pub fn register_builtins(registry: &mut CommandRegistry) {
    registry.register("set", set_command);
    registry.register("display", display_command);
}

/// `set <name> = <value>`
///
/// Binds `name` to the parsed value, replacing any earlier binding.  An
/// object literal left open on this line pulls in the following lines.
pub fn set_command(input: &CommandInput<'_>, session: &mut Session<'_>) -> Result<usize, ScriptError> {
    let line = input.line;
    let caps = set_re()
        .captures(line)
        .ok_or_else(|| ScriptError::InvalidSetSyntax(line.to_owned()))?;
    let name = &caps[1];
    let value_src = caps[2].trim();

    let (literal, consumed) = if value_src.starts_with('{') {
        let agg = aggregate_object(value_src, line, input.lines, input.braces, input.index)?;
        (agg.text, agg.consumed)
    } else {
        (value_src.to_owned(), 0)
    };

    let value = parse_value(&literal, &session.vars, line)?;
    tracing::trace!(name, kind = value.type_name(), consumed, "set");
    session.vars.set(name, value);
    Ok(consumed)
}

/// `display(<expr>)`
///
/// Evaluates the expression against the current bindings and renders the
/// result as the next output line.
pub fn display_command(input: &CommandInput<'_>, session: &mut Session<'_>) -> Result<usize, ScriptError> {
    let line = input.line;
    let caps = display_re()
        .captures(line)
        .ok_or_else(|| ScriptError::InvalidDisplaySyntax(line.to_owned()))?;
    let expr = caps[1].trim();

    let value = eval_str(expr, &session.vars).map_err(|reason| ScriptError::ExpressionEvaluation {
        expr: expr.to_owned(),
        reason,
    })?;

    session.display.emit(&value.to_string(), Color::TEXT);
    Ok(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::error::EvalError;
    use crate::script::literal::BraceIndex;
    use crate::script::value::{FlatObject, Value};
    use crate::surface::RecordingSurface;

    fn run_one(
        surface: &mut RecordingSurface,
        session_vars: &[(&str, Value)],
        lines: &[&str],
        index: usize,
        cmd: fn(&CommandInput<'_>, &mut Session<'_>) -> Result<usize, ScriptError>,
    ) -> (Result<usize, ScriptError>, Vec<(String, Value)>) {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let mut session = Session::new(surface);
        for (k, v) in session_vars {
            session.vars.set(*k, v.clone());
        }
        let braces = BraceIndex::new(&lines);
        let input = CommandInput {
            line: &lines[index],
            lines: &lines,
            braces: &braces,
            index,
        };
        let res = cmd(&input, &mut session);
        let mut bound: Vec<(String, Value)> = ["x", "p", "s", "y"]
            .iter()
            .filter_map(|k| session.vars.get(k).map(|v| (k.to_string(), v.clone())))
            .collect();
        bound.sort_by(|a, b| a.0.cmp(&b.0));
        (res, bound)
    }

    #[test]
    fn set_scalar() {
        let mut s = RecordingSurface::new();
        let (res, bound) = run_one(&mut s, &[], &["set x = 42"], 0, set_command);
        assert_eq!(res, Ok(0));
        assert_eq!(bound, vec![("x".into(), Value::Number(42.0))]);
    }

    #[test]
    fn set_without_spaces() {
        let mut s = RecordingSurface::new();
        let (res, bound) = run_one(&mut s, &[], &["set x='a b'"], 0, set_command);
        assert_eq!(res, Ok(0));
        assert_eq!(bound, vec![("x".into(), Value::String("a b".into()))]);
    }

    #[test]
    fn set_multiline_object() {
        let mut s = RecordingSurface::new();
        let (res, bound) =
            run_one(&mut s, &[], &["set p = {", "a: 1,", "b: 2}"], 0, set_command);
        assert_eq!(res, Ok(2));
        let mut expected = FlatObject::new();
        expected.insert("a", Value::Number(1.0));
        expected.insert("b", Value::Number(2.0));
        assert_eq!(bound, vec![("p".into(), Value::Object(expected))]);
    }

    #[test]
    fn set_bad_syntax() {
        let mut s = RecordingSurface::new();
        for line in ["set = 1", "set x 1", "set x =", "set 1-2 = 3"] {
            let (res, _) = run_one(&mut s, &[], &[line], 0, set_command);
            assert_eq!(res, Err(ScriptError::InvalidSetSyntax(line.into())), "{line}");
        }
    }

    #[test]
    fn set_replaces_binding_of_other_type() {
        let mut s = RecordingSurface::new();
        let (res, bound) =
            run_one(&mut s, &[("x", Value::Number(1.0))], &["set x = true"], 0, set_command);
        assert_eq!(res, Ok(0));
        assert_eq!(bound, vec![("x".into(), Value::Boolean(true))]);
    }

    #[test]
    fn display_renders_at_first_slot() {
        let mut s = RecordingSurface::new();
        let (res, _) = run_one(
            &mut s,
            &[("x", Value::Number(2.0)), ("y", Value::Number(3.0))],
            &["display(x + y)"],
            0,
            display_command,
        );
        assert_eq!(res, Ok(0));
        let call = &s.calls()[0];
        assert_eq!((call.text.as_str(), call.x, call.y), ("5", 10.0, 20.0));
        assert_eq!(call.color, Color::TEXT);
    }

    #[test]
    fn display_bad_syntax() {
        let mut s = RecordingSurface::new();
        let (res, _) = run_one(&mut s, &[], &["display(1) extra"], 0, display_command);
        assert_eq!(
            res,
            Err(ScriptError::InvalidDisplaySyntax("display(1) extra".into()))
        );
        assert!(s.calls().is_empty());
    }

    #[test]
    fn display_unknown_identifier() {
        let mut s = RecordingSurface::new();
        let (res, _) = run_one(&mut s, &[], &["display(undefinedVar)"], 0, display_command);
        assert_eq!(
            res,
            Err(ScriptError::ExpressionEvaluation {
                expr: "undefinedVar".into(),
                reason: EvalError::UnknownIdentifier("undefinedVar".into()),
            })
        );
        assert!(s.calls().is_empty());
    }
}
