use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tela::cli::{self, CliArgs, ConfigFile};
use tela::config::Config;
use tela::script::{interpret, CommandRegistry};
use tela::surface::{Surface, Surfaces, WriteSurface};
use tela::terminal::TerminalSurface;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("tela: {e}");
            eprintln!("{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    init_tracing(args.debug);

    if args.list_commands {
        for kw in CommandRegistry::with_builtins().keywords() {
            println!("{kw}");
        }
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tela: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr; `RUST_LOG` applies unless `-d` was given.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("tela=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tela=warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(args: CliArgs) -> Result<(), String> {
    let config = load_config(&args.config);
    let source = read_script(args.script.as_deref())?;

    // A piped stdout gets the dump format; escape codes would be noise there.
    let dump = args.dump || !stdout_is_tty();
    let surface: Box<dyn Surface> = if dump {
        Box::new(WriteSurface::new(io::stdout()))
    } else {
        Box::new(TerminalSurface::new(io::stdout(), &config))
    };

    let mut surfaces: Surfaces = Surfaces::new();
    surfaces.insert(config.surface.clone(), surface);

    let target = args.target.as_deref().unwrap_or(&config.surface);
    let result = interpret(&mut surfaces, target, &source);
    // drop the surface first so the terminal is parked before any message
    drop(surfaces);

    let report = result.map_err(|e| e.to_string())?;
    tracing::debug!(?report, "done");
    Ok(())
}

fn load_config(choice: &ConfigFile) -> Config {
    let path = match choice {
        ConfigFile::Skip => return Config::default(),
        ConfigFile::Explicit(p) => Some(p.clone()),
        ConfigFile::Search => cli::find_user_config(),
    };
    let Some(path) = path else {
        return Config::default();
    };

    match Config::load_file(&path) {
        Ok((config, errors)) => {
            for e in errors {
                tracing::warn!(file = %path.display(), "{e}");
            }
            config
        }
        Err(e) => {
            eprintln!("tela: warning: {}: {e}", path.display());
            Config::default()
        }
    }
}

fn read_script(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|e| format!("{}: {e}", p.display())),
        None => {
            let mut s = String::new();
            io::stdin()
                .read_to_string(&mut s)
                .map_err(|e| format!("stdin: {e}"))?;
            Ok(s)
        }
    }
}

fn stdout_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDOUT_FILENO) != 0 }
}
