//! Runs the `tela` binary end to end.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;

fn tela() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tela"));
    cmd.env_remove("RUST_LOG").env_remove("TELARC");
    cmd
}

fn script_file(src: &str) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp script");
    f.write_all(src.as_bytes()).expect("write script");
    f
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn dump_prints_draw_calls() {
    let f = script_file("set x = 2\nset y = 3\ndisplay(x + y)\nbogus\n");
    let out = tela().arg("-f").arg("--dump").arg(f.path()).output().unwrap();
    assert!(out.status.success(), "{out:?}");
    assert_eq!(
        stdout(&out),
        "10\t20\t#000000\t5\n10\t40\t#FF0000\tErro: Comando desconhecido: bogus\n"
    );
}

#[test]
fn reads_script_from_stdin() {
    let mut child = tela()
        .args(["-f", "--dump", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"display('hi')\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "10\t20\t#000000\thi\n");
}

#[test]
fn unknown_target_exits_with_error() {
    let f = script_file("display(1)\n");
    let out = tela()
        .args(["-f", "--dump", "-snowhere"])
        .arg(f.path())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("Canvas não encontrado ou contexto inválido: nowhere"), "{err}");
}

#[test]
fn rc_file_renames_the_surface() {
    let rc = script_file("; test rc\nset surface=canvas\n");
    let f = script_file("display(1)\n");
    let mut rc_flag = std::ffi::OsString::from("-f");
    rc_flag.push(rc.path());

    let out = tela()
        .arg(&rc_flag)
        .args(["--dump", "-scanvas"])
        .arg(f.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "{out:?}");
    assert_eq!(stdout(&out), "10\t20\t#000000\t1\n");

    // `main` no longer exists
    let out = tela().arg(&rc_flag).arg("--dump").arg("-smain").arg(f.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn lists_commands() {
    let out = tela().arg("--commands").output().unwrap();
    assert!(out.status.success());
    assert_eq!(stdout(&out), "display\nset\n");
}

#[test]
fn bad_option_prints_usage() {
    let out = tela().arg("-z").output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let err = String::from_utf8_lossy(&out.stderr);
    assert!(err.contains("unknown option: -z"));
    assert!(err.contains("Usage: tela"));
}

#[test]
fn missing_script_file_fails() {
    let out = tela()
        .args(["-f", "--dump", "/definitely/not/here.tela"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("tela: /definitely/not/here.tela"));
}
