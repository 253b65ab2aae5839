//! Command-line argument parsing.
//!
//! Usage:
//!   tela [-f[<rcfile>]] [-s<target>] [-d] [--dump] [--commands] [<script>]

use std::path::PathBuf;

/// Usage text printed on argument errors and `--help`.
pub const USAGE: &str = "\
Usage: tela [-f[<rcfile>]] [-s<target>] [-d] [--dump] [--commands] [<script>]

  -f<rcfile>   load this rc file instead of searching for .telarc
  -f           skip the rc file
  -s<target>   draw on surface <target> (default: rc `surface`, or main)
  -d           debug logging on stderr
  --dump       print draw calls as `x<TAB>y<TAB>color<TAB>text`
  --commands   list the registered commands and exit
  <script>     script file to run; `-` or absent reads stdin";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Which rc file to load.
    pub config: ConfigFile,
    /// Surface target override (`-s<target>`).
    pub target: Option<String>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Print draw calls instead of drawing (`--dump`).
    pub dump: bool,
    /// List command keywords and exit (`--commands`).
    pub list_commands: bool,
    /// Print usage and exit (`-h`, `--help`).
    pub help: bool,
    /// Script to run; `None` reads stdin.
    pub script: Option<PathBuf>,
}

/// How to choose the rc file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Search the standard locations (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip the rc file.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        match arg {
            "--dump" => args.dump = true,
            "--commands" => args.list_commands = true,
            "--help" => args.help = true,
            _ if arg.starts_with("--") => return Err(format!("unknown option: {arg}")),
            _ if !arg.starts_with('-') || arg == "-" => positional.push(arg.to_owned()),
            _ => parse_short(&arg[1..], argv, &mut i, &mut args)?,
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => {
            let script = positional.remove(0);
            if script != "-" {
                args.script = Some(PathBuf::from(script));
            }
        }
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

/// Parse one cluster of short flags such as `-dfmy.rc`.
fn parse_short(
    cluster: &str,
    argv: &[String],
    i: &mut usize,
    args: &mut CliArgs,
) -> Result<(), String> {
    let chars: Vec<char> = cluster.chars().collect();
    let mut j = 0;
    while j < chars.len() {
        match chars[j] {
            'd' => args.debug = true,
            'h' => args.help = true,

            // -f[<file>]: the file must be attached, since a bare word
            // after -f is the script.
            'f' => {
                if j + 1 < chars.len() {
                    let file: String = chars[j + 1..].iter().collect();
                    args.config = ConfigFile::Explicit(PathBuf::from(file));
                    j = chars.len();
                } else {
                    args.config = ConfigFile::Skip;
                }
            }

            // -s<target>
            's' => {
                let target = if j + 1 < chars.len() {
                    let s: String = chars[j + 1..].iter().collect();
                    j = chars.len();
                    s
                } else if *i + 1 < argv.len() {
                    *i += 1;
                    argv[*i].clone()
                } else {
                    return Err("-s requires a target argument".to_owned());
                };
                args.target = Some(target);
            }

            c => return Err(format!("unknown option: -{c}")),
        }
        j += 1;
    }
    Ok(())
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the rc file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    config_candidates(std::env::var("TELARC").ok(), std::env::var("HOME").ok())
        .into_iter()
        .find(|p| p.exists())
}

/// Candidate rc paths in priority order: `$TELARC`, the platform config
/// directory, `~/.telarc`, `./.telarc`.
pub fn config_candidates(telarc: Option<String>, home: Option<String>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = telarc.filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(p));
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "tela") {
        paths.push(dirs.config_dir().join("telarc"));
    }
    if let Some(h) = home.filter(|h| !h.is_empty()) {
        paths.push(PathBuf::from(h).join(".telarc"));
    }
    paths.push(PathBuf::from("./.telarc"));
    paths
}

// ── Tests ─────────────────────────────────────────────────────────────────────
