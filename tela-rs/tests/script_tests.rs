//! End-to-end runs of whole scripts against a recording surface.

use tela::color::Color;
use tela::script::{interpret, FlatObject, Interpreter, ScriptError, Value};
use tela::surface::{DrawCall, RecordingSurface, Surfaces};

fn run(src: &str) -> Vec<DrawCall> {
    let mut surface = RecordingSurface::new();
    Interpreter::new(&mut surface).run(src);
    surface.take_calls()
}

fn texts(src: &str) -> Vec<String> {
    run(src).into_iter().map(|c| c.text).collect()
}

#[test]
fn scalar_literals_keep_their_type() {
    let mut surface = RecordingSurface::new();
    let mut interp = Interpreter::new(&mut surface);
    interp.run(
        "set n = -12.5\nset i = 7\nset t = true\nset f = false\nset s = \"a b\"\nset q = 'x'",
    );
    let vars = interp.vars();
    assert_eq!(vars.get("n"), Some(&Value::Number(-12.5)));
    assert_eq!(vars.get("i"), Some(&Value::Number(7.0)));
    assert_eq!(vars.get("t"), Some(&Value::Boolean(true)));
    assert_eq!(vars.get("f"), Some(&Value::Boolean(false)));
    assert_eq!(vars.get("s"), Some(&Value::String("a b".into())));
    assert_eq!(vars.get("q"), Some(&Value::String("x".into())));
}

#[test]
fn sum_renders_at_first_slot() {
    let calls = run("set x = 2\nset y = 3\ndisplay(x + y)");
    assert_eq!(
        calls,
        vec![DrawCall {
            text: "5".into(),
            x: 10.0,
            y: 20.0,
            color: Color::TEXT,
        }]
    );
}

#[test]
fn three_line_object_literal() {
    let mut surface = RecordingSurface::new();
    let mut interp = Interpreter::new(&mut surface);
    let report = interp.run("set p = {\na: 1,\nb: 2}\ndisplay(p)");
    let mut expected = FlatObject::new();
    expected.insert("a", Value::Number(1.0));
    expected.insert("b", Value::Number(2.0));
    assert_eq!(interp.vars().get("p"), Some(&Value::Object(expected)));
    // three physical lines became one command
    assert_eq!(report.lines, 4);
    assert_eq!(report.rendered, 1);
    drop(interp);
    assert_eq!(surface.texts(), vec!["{a: 1, b: 2}"]);
}

#[test]
fn unbalanced_object_is_malformed() {
    let calls = run("set p = {");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "Erro: Objeto malformado em: set p = {");
    assert_eq!(calls[0].color, Color::ERROR);
}

#[test]
fn unknown_command_then_continue() {
    let calls = run("set a = 1\nwhat is this\nset a = 2\ndisplay(a)");
    assert_eq!(calls[0].text, "Erro: Comando desconhecido: what is this");
    assert_eq!(calls[0].color, Color::ERROR);
    assert_eq!(calls[1].text, "2");
    assert_eq!(calls[1].y, 40.0);
}

#[test]
fn cold_runs_are_identical() {
    let src = "set p = { a: 1, b: 'two' }\ndisplay(p.a * 10)\nnope\ndisplay(p)\ndisplay(zz)";
    assert_eq!(run(src), run(src));

    let mut surfaces = Surfaces::new();
    surfaces.insert("main", RecordingSurface::new());
    interpret(&mut surfaces, "main", src).unwrap();
    let first = surfaces.get_mut("main").unwrap().take_calls();
    interpret(&mut surfaces, "main", src).unwrap();
    let second = surfaces.get_mut("main").unwrap().take_calls();
    assert_eq!(first, second);
}

#[test]
fn undefined_variable_renders_error() {
    let calls = run("display(undefinedVar)\ndisplay(1)");
    assert_eq!(calls[0].text, "Erro: Erro ao avaliar expressão: undefinedVar");
    assert_eq!(calls[0].color, Color::ERROR);
    assert_eq!(calls[1].text, "1");
}

#[test]
fn quoted_string_round_trips_into_object() {
    let mut surface = RecordingSurface::new();
    let mut interp = Interpreter::new(&mut surface);
    interp.run("set s = 'hi'\nset o = { greeting: s, raw: 'a\\nb' }");
    let Some(Value::Object(o)) = interp.vars().get("o") else {
        panic!("o is not an object: {:?}", interp.vars().get("o"));
    };
    assert_eq!(o.get("greeting"), Some(&Value::String("hi".into())));
    // no escape processing in set values
    assert_eq!(o.get("raw"), Some(&Value::String("a\\nb".into())));
}

#[test]
fn lines_are_spaced_by_twenty() {
    let src = "display(1)\nset x = \ndisplay(2)\ndisplay(\ndisplay(3)";
    let ys: Vec<f64> = run(src).iter().map(|c| c.y).collect();
    let expected: Vec<f64> = (1..=ys.len()).map(|n| 20.0 * n as f64).collect();
    assert_eq!(ys, expected);
    assert!(run(src).iter().all(|c| c.x == 10.0));
}

#[test]
fn expressions() {
    assert_eq!(
        texts("set a = 4\nset b = 6\ndisplay((a + b) / 4)\ndisplay(a < b && !false)\ndisplay('n=' + a)"),
        vec!["2.5", "true", "n=4"]
    );
}

#[test]
fn extreme_numbers_use_exponent_form() {
    assert_eq!(
        texts("display(1e21)\ndisplay(0.0000001)\nset big = 2e300\ndisplay(big)\ndisplay(0.000001)"),
        vec!["1e+21", "1e-7", "2e+300", "0.000001"]
    );
}

#[test]
fn braces_inside_one_line_strings() {
    let mut surface = RecordingSurface::new();
    let mut interp = Interpreter::new(&mut surface);
    let report = interp.run("set open = {a: '{'}\nset close = {b: '}'}\ndisplay(open.a + close.b)");
    assert_eq!(report.errors, 0);
    drop(interp);
    assert_eq!(surface.texts(), vec!["{}"]);
}

#[test]
fn missing_surface_is_fatal() {
    let mut surfaces: Surfaces<RecordingSurface> = Surfaces::new();
    surfaces.insert("main", RecordingSurface::new());
    let err = interpret(&mut surfaces, "canvas", "display(1)").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Canvas não encontrado ou contexto inválido: canvas"
    );
    assert!(matches!(err, ScriptError::SurfaceUnavailable(_)));
    assert!(surfaces.get("main").unwrap().calls().is_empty());
}
