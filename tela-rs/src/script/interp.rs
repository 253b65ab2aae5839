//! The tela execution loop.
//!
//! An [`Interpreter`] owns everything one run needs: the command registry,
//! the variable store and the display counter.  Lines are executed strictly
//! in order; a failing line is rendered as an `Erro: …` line in the error
//! color at the slot its output would have taken, and execution continues
//! with the next line.

use crate::color::Color;
use crate::surface::{Surface, SurfaceProvider};

use super::error::ScriptError;
use super::literal::BraceIndex;
use super::registry::{CommandInput, CommandRegistry};
use super::value::VarStore;

/// Left edge of every rendered line.
pub const TEXT_X: f64 = 10.0;
/// Baseline of the first rendered line.
pub const FIRST_LINE_Y: f64 = 20.0;
/// Vertical distance between consecutive rendered lines.
pub const LINE_HEIGHT: f64 = 20.0;

/// Prefix of rendered error lines.
pub const ERROR_PREFIX: &str = "Erro: ";

// ── Display ───────────────────────────────────────────────────────────────────

/// Output side of a run: the surface plus the count of lines drawn so far.
pub struct Display<'s> {
    surface: &'s mut dyn Surface,
    count: usize,
}

impl<'s> Display<'s> {
    pub fn new(surface: &'s mut dyn Surface) -> Self {
        Self { surface, count: 0 }
    }

    /// Draw `text` as the next output line.
    pub fn emit(&mut self, text: &str, color: Color) {
        self.count += 1;
        let y = FIRST_LINE_Y + LINE_HEIGHT * (self.count - 1) as f64;
        self.surface.draw_text(text, TEXT_X, y, color);
    }

    /// Number of lines drawn so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Mutable state visible to command handlers.
pub struct Session<'s> {
    pub vars: VarStore,
    pub display: Display<'s>,
}

impl<'s> Session<'s> {
    pub fn new(surface: &'s mut dyn Surface) -> Self {
        Self {
            vars: VarStore::new(),
            display: Display::new(surface),
        }
    }
}

// ── LineStream ────────────────────────────────────────────────────────────────

/// The trimmed, non-blank lines of a script, with their brace index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineStream {
    lines: Vec<String>,
    braces: BraceIndex,
}

impl LineStream {
    pub fn from_source(src: &str) -> Self {
        let lines: Vec<String> = src
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect();
        let braces = BraceIndex::new(&lines);
        Self { lines, braces }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    pub fn braces(&self) -> &BraceIndex {
        &self.braces
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Determine the command keyword of a line.
///
/// Lines containing `(` are keyed by the text before the first `(`; other
/// lines beginning with `set ` are `set` commands; anything else has none.
pub fn command_keyword(line: &str) -> Option<&str> {
    if let Some(paren) = line.find('(') {
        Some(&line[..paren])
    } else if line.starts_with("set ") {
        Some("set")
    } else {
        None
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// Summary of one [`Interpreter::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Non-blank source lines.
    pub lines: usize,
    /// Lines drawn on the surface, including error lines.
    pub rendered: usize,
    /// Lines that failed.
    pub errors: usize,
}

/// The tela interpreter for one run.
pub struct Interpreter<'s> {
    registry: CommandRegistry,
    session: Session<'s>,
}

impl<'s> Interpreter<'s> {
    /// A fresh interpreter with the built-in commands, drawing on `surface`.
    pub fn new(surface: &'s mut dyn Surface) -> Self {
        Self {
            registry: CommandRegistry::with_builtins(),
            session: Session::new(surface),
        }
    }

    /// The command table; register extra commands here before running.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn vars(&self) -> &VarStore {
        &self.session.vars
    }

    /// Execute `src` line by line.
    ///
    /// Calling `run` again continues the same run: bindings and the display
    /// counter carry over.  Use a new interpreter for an independent run.
    pub fn run(&mut self, src: &str) -> RunReport {
        let lines = LineStream::from_source(src);
        let rendered_before = self.session.display.count();
        let mut report = RunReport {
            lines: lines.len(),
            ..RunReport::default()
        };

        let mut index = 0;
        while index < lines.len() {
            match self.dispatch(&lines, index) {
                Ok(consumed) => index += 1 + consumed,
                Err(e) => {
                    tracing::debug!(line = index + 1, kind = e.kind(), error = %e, "line failed");
                    self.session
                        .display
                        .emit(&format!("{ERROR_PREFIX}{e}"), Color::ERROR);
                    report.errors += 1;
                    index += 1;
                }
            }
        }

        report.rendered = self.session.display.count() - rendered_before;
        report
    }

    /// Execute the line at `index`, returning the extra lines it consumed.
    fn dispatch(&mut self, lines: &LineStream, index: usize) -> Result<usize, ScriptError> {
        let slice = lines.as_slice();
        let line = slice[index].as_str();
        tracing::trace!(line = index + 1, text = line, "dispatch");

        let handler = command_keyword(line)
            .and_then(|kw| self.registry.get(kw))
            .ok_or_else(|| ScriptError::UnknownCommand(line.to_owned()))?;

        let input = CommandInput {
            line,
            lines: slice,
            braces: lines.braces(),
            index,
        };
        handler(&input, &mut self.session)
    }
}

/// Run `source` against the surface registered for `target`.
///
/// Fails with [`ScriptError::SurfaceUnavailable`] before executing anything
/// if `provider` has no such surface.  Every other error is rendered on the
/// surface and counted in the returned report.
#[tracing::instrument(level = "info", skip(provider, source), fields(source_len = source.len()))]
pub fn interpret(
    provider: &mut dyn SurfaceProvider,
    target: &str,
    source: &str,
) -> Result<RunReport, ScriptError> {
    let surface = provider
        .surface(target)
        .ok_or_else(|| ScriptError::SurfaceUnavailable(target.to_owned()))?;
    let report = Interpreter::new(surface).run(source);
    tracing::info!(
        lines = report.lines,
        rendered = report.rendered,
        errors = report.errors,
        "run complete"
    );
    Ok(report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::value::Value;
    use crate::surface::{RecordingSurface, Surfaces};

    fn run(src: &str) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        Interpreter::new(&mut surface).run(src);
        surface
    }

    #[test]
    fn keyword_rules() {
        assert_eq!(command_keyword("display(x)"), Some("display"));
        assert_eq!(command_keyword("set x = 1"), Some("set"));
        // a parenthesis wins over the set prefix
        assert_eq!(command_keyword("set x = (1)"), Some("set x = "));
        assert_eq!(command_keyword("display (x)"), Some("display "));
        assert_eq!(command_keyword("setx = 1"), None);
        assert_eq!(command_keyword("hello"), None);
    }

    #[test]
    fn line_stream_trims_and_drops_blanks() {
        let ls = LineStream::from_source("  set x = 1  \n\n\t\r\ndisplay(x)\r\n");
        assert_eq!(ls.as_slice(), &["set x = 1".to_owned(), "display(x)".to_owned()]);
        assert_eq!(ls.get(1), Some("display(x)"));
        assert!(LineStream::from_source(" \n \n").is_empty());
    }

    #[test]
    fn sum_of_two_variables() {
        let s = run("set x = 2\nset y = 3\ndisplay(x + y)");
        assert_eq!(s.calls().len(), 1);
        let c = &s.calls()[0];
        assert_eq!((c.text.as_str(), c.x, c.y, c.color), ("5", 10.0, 20.0, Color::TEXT));
    }

    #[test]
    fn unknown_command_does_not_stop_the_run() {
        let s = run("frobnicate\ndisplay(1)");
        assert_eq!(s.texts(), vec!["Erro: Comando desconhecido: frobnicate", "1"]);
        assert_eq!(s.calls()[0].color, Color::ERROR);
        assert_eq!(s.calls()[1].y, 40.0);
    }

    #[test]
    fn unregistered_keyword_is_unknown() {
        let s = run("print(1)");
        assert_eq!(s.texts(), vec!["Erro: Comando desconhecido: print(1)"]);
    }

    #[test]
    fn multiline_object_skips_consumed_lines() {
        let s = run("set p = {\na: 1,\nb: 2}\ndisplay(p.a + p.b)\ndisplay(p)");
        assert_eq!(s.texts(), vec!["3", "{a: 1, b: 2}"]);
    }

    #[test]
    fn braces_in_strings_stay_on_one_line() {
        let s = run("set p = {a: '}'}\ndisplay(p.a)");
        assert_eq!(s.texts(), vec!["}"]);

        let s = run("set p = {a: '{'}\ndisplay(1)\nset q = 2\n}\ndisplay(p.a + q)");
        assert_eq!(s.texts(), vec!["1", "Erro: Comando desconhecido: }", "{2"]);
    }

    #[test]
    fn unbalanced_object_reports_and_continues() {
        let s = run("set p = {\na: 1");
        assert_eq!(
            s.texts(),
            vec!["Erro: Objeto malformado em: set p = {", "Erro: Comando desconhecido: a: 1"]
        );
    }

    #[test]
    fn errors_and_output_share_slots() {
        let s = run("display(1)\nbad\ndisplay(2)");
        let ys: Vec<f64> = s.calls().iter().map(|c| c.y).collect();
        assert_eq!(ys, vec![20.0, 40.0, 60.0]);
    }

    #[test]
    fn report_counts() {
        let mut surface = RecordingSurface::new();
        let report = Interpreter::new(&mut surface).run("set x = 1\n\nnope\ndisplay(x)");
        assert_eq!(
            report,
            RunReport {
                lines: 3,
                rendered: 2,
                errors: 1
            }
        );
    }

    #[test]
    fn custom_command_via_registry() {
        let mut surface = RecordingSurface::new();
        let mut interp = Interpreter::new(&mut surface);
        interp.registry_mut().register(
            "shout",
            |input: &CommandInput<'_>, session: &mut Session<'_>| {
                let arg = input
                    .line
                    .strip_prefix("shout(")
                    .and_then(|r| r.strip_suffix(')'))
                    .unwrap_or_default();
                session.display.emit(&arg.to_uppercase(), Color::TEXT);
                Ok(0)
            },
        );
        interp.run("shout(hey)\nset x = 1");
        assert_eq!(interp.vars().get("x"), Some(&Value::Number(1.0)));
        drop(interp);
        assert_eq!(surface.texts(), vec!["HEY"]);
    }

    #[test]
    fn interpret_requires_surface() {
        let mut surfaces: Surfaces<RecordingSurface> = Surfaces::new();
        let err = interpret(&mut surfaces, "missing", "display(1)").unwrap_err();
        assert_eq!(err, ScriptError::SurfaceUnavailable("missing".into()));
        assert!(err.is_fatal());
    }

    #[test]
    fn interpret_draws_on_target() {
        let mut surfaces = Surfaces::new();
        surfaces.insert("main", RecordingSurface::new());
        surfaces.insert("other", RecordingSurface::new());
        let report = interpret(&mut surfaces, "main", "display('hi')").unwrap();
        assert_eq!(report.rendered, 1);
        assert_eq!(surfaces.get("main").unwrap().texts(), vec!["hi"]);
        assert!(surfaces.get("other").unwrap().calls().is_empty());
    }

    #[test]
    fn each_interpret_starts_cold() {
        let mut surfaces = Surfaces::new();
        surfaces.insert("main", RecordingSurface::new());
        interpret(&mut surfaces, "main", "set x = 1\ndisplay(x)").unwrap();
        interpret(&mut surfaces, "main", "display(x)").unwrap();
        let calls = surfaces.get("main").unwrap().calls();
        assert_eq!(calls[1].text, "Erro: Erro ao avaliar expressão: x");
        // counter restarted
        assert_eq!(calls[1].y, 20.0);
    }
}
