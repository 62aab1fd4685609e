//! Integration tests for the IPPcode CLI.
//!
//! These tests invoke the `ippcode` binary as a subprocess and check
//! exit codes, stdout, stderr and the statistics file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[allow(deprecated)]
fn ippcode() -> Command {
    Command::cargo_bin("ippcode").unwrap()
}

/// Wrap instruction elements in a `<program>` root.
fn program_xml(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<program language=\"IPPcode18\">\n{body}\n</program>\n"
    )
}

/// Write a program file into `dir` and return its path.
fn write_program(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("prog.xml");
    fs::write(&path, program_xml(body)).unwrap();
    path
}

fn source_arg(path: &Path) -> String {
    format!("--source={}", path.display())
}

const HELLO: &str =
    r#"<instruction order="1" opcode="WRITE"><arg1 type="string">Hello,\032world!</arg1></instruction>"#;

const COUNTER: &str = r#"
<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@i</arg1></instruction>
<instruction order="2" opcode="MOVE"><arg1 type="var">GF@i</arg1><arg2 type="int">0</arg2></instruction>
<instruction order="3" opcode="LABEL"><arg1 type="label">loop</arg1></instruction>
<instruction order="4" opcode="ADD">
  <arg1 type="var">GF@i</arg1><arg2 type="var">GF@i</arg2><arg3 type="int">1</arg3>
</instruction>
<instruction order="5" opcode="JUMPIFNEQ">
  <arg1 type="label">loop</arg1><arg2 type="var">GF@i</arg2><arg3 type="int">3</arg3>
</instruction>
<instruction order="6" opcode="CREATEFRAME"/>
<instruction order="7" opcode="DEFVAR"><arg1 type="var">TF@a</arg1></instruction>
"#;

// ---- Usage ----

#[test]
fn help_flag_exits_0() {
    ippcode()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--source"));
}

#[cfg(target_os = "linux")]
#[test]
fn help_to_full_device_exits_99() {
    use assert_cmd::assert::OutputAssertExt;
    use assert_cmd::cargo::CommandCargoExt;

    let full = fs::OpenOptions::new().write(true).open("/dev/full").unwrap();
    #[allow(deprecated)]
    let mut cmd = std::process::Command::cargo_bin("ippcode").unwrap();
    cmd.arg("--help").stdout(full).assert().failure().code(99);
}

#[test]
fn no_args_exits_10() {
    ippcode()
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn unknown_flag_exits_10() {
    ippcode()
        .args(["--source=x.xml", "--turbo"])
        .assert()
        .failure()
        .code(10);
}

#[test]
fn selector_without_stats_exits_10() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, HELLO);
    ippcode()
        .args([source_arg(&path).as_str(), "--insts"])
        .assert()
        .failure()
        .code(10)
        .stdout("");
}

#[test]
fn repeated_selector_exits_10() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, HELLO);
    let stats = dir.path().join("stats.txt");
    ippcode()
        .arg(source_arg(&path))
        .arg(format!("--stats={}", stats.display()))
        .args(["--insts", "--insts"])
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("--insts may be given only once"));
    assert!(!stats.exists());
}

// ---- Loading ----

#[test]
fn missing_source_exits_11() {
    let dir = TempDir::new().unwrap();
    ippcode()
        .arg(source_arg(&dir.path().join("nope.xml")))
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn malformed_xml_exits_31() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.xml");
    fs::write(&path, "<program language=\"IPPcode18\">").unwrap();
    ippcode().arg(source_arg(&path)).assert().failure().code(31);
}

#[test]
fn unknown_opcode_exits_32() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, r#"<instruction order="1" opcode="NOP"/>"#);
    ippcode()
        .arg(source_arg(&path))
        .assert()
        .failure()
        .code(32)
        .stderr(predicate::str::contains("unknown opcode 'NOP'"));
}

// ---- Execution ----

#[test]
fn hello_world() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, HELLO);
    ippcode()
        .arg(source_arg(&path))
        .assert()
        .success()
        .stdout("Hello, world!\n");
}

#[test]
fn read_consumes_stdin() {
    let dir = TempDir::new().unwrap();
    let path = write_program(
        &dir,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@n</arg1></instruction>
           <instruction order="2" opcode="READ"><arg1 type="var">GF@n</arg1><arg2 type="type">int</arg2></instruction>
           <instruction order="3" opcode="MUL">
             <arg1 type="var">GF@n</arg1><arg2 type="var">GF@n</arg2><arg3 type="int">2</arg3>
           </instruction>
           <instruction order="4" opcode="WRITE"><arg1 type="var">GF@n</arg1></instruction>"#,
    );
    ippcode()
        .arg(source_arg(&path))
        .write_stdin("21\n")
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn dprint_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let path = write_program(
        &dir,
        r#"<instruction order="1" opcode="DPRINT"><arg1 type="string">debug</arg1></instruction>"#,
    );
    ippcode()
        .arg(source_arg(&path))
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("debug"));
}

#[test]
fn runtime_error_keeps_earlier_output() {
    let dir = TempDir::new().unwrap();
    let path = write_program(
        &dir,
        r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@x</arg1></instruction>
           <instruction order="2" opcode="WRITE"><arg1 type="string">before</arg1></instruction>
           <instruction order="3" opcode="IDIV">
             <arg1 type="var">GF@x</arg1><arg2 type="int">7</arg2><arg3 type="int">0</arg3>
           </instruction>
           <instruction order="4" opcode="WRITE"><arg1 type="string">after</arg1></instruction>"#,
    );
    ippcode()
        .arg(source_arg(&path))
        .assert()
        .failure()
        .code(57)
        .stdout("before\n")
        .stderr(predicate::str::contains("division by zero at instruction 3"));
}

#[test]
fn runtime_error_codes_pass_through() {
    let dir = TempDir::new().unwrap();
    let cases = [
        (r#"<instruction order="1" opcode="JUMP"><arg1 type="label">x</arg1></instruction>"#, 52),
        (r#"<instruction order="1" opcode="WRITE"><arg1 type="var">GF@x</arg1></instruction>"#, 54),
        (r#"<instruction order="1" opcode="POPFRAME"/>"#, 55),
        (r#"<instruction order="1" opcode="RETURN"/>"#, 56),
    ];
    for (body, code) in cases {
        let path = write_program(&dir, body);
        ippcode().arg(source_arg(&path)).assert().failure().code(code);
    }
}

// ---- Statistics ----

#[test]
fn stats_follow_selector_order() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, COUNTER);
    let stats = dir.path().join("stats.txt");
    ippcode()
        .arg(source_arg(&path))
        .args(["--vars"])
        .arg(format!("--stats={}", stats.display()))
        .args(["--insts"])
        .assert()
        .success();
    // DEFVAR, MOVE, LABEL, then three rounds of ADD and JUMPIFNEQ,
    // CREATEFRAME and DEFVAR.
    assert_eq!(fs::read_to_string(&stats).unwrap(), "2\n11\n");
}

#[test]
fn stats_with_no_selectors_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, HELLO);
    let stats = dir.path().join("stats.txt");
    ippcode()
        .arg(source_arg(&path))
        .arg(format!("--stats={}", stats.display()))
        .assert()
        .success();
    assert_eq!(fs::read_to_string(&stats).unwrap(), "");
}

#[test]
fn unwritable_stats_exits_11() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, HELLO);
    let stats = dir.path().join("missing-dir").join("stats.txt");
    ippcode()
        .arg(source_arg(&path))
        .arg(format!("--stats={}", stats.display()))
        .arg("--insts")
        .assert()
        .failure()
        .code(11)
        .stdout("Hello, world!\n")
        .stderr(predicate::str::contains("cannot write statistics"));
}

#[test]
fn stats_not_written_after_runtime_error() {
    let dir = TempDir::new().unwrap();
    let path = write_program(&dir, r#"<instruction order="1" opcode="RETURN"/>"#);
    let stats = dir.path().join("stats.txt");
    ippcode()
        .arg(source_arg(&path))
        .arg(format!("--stats={}", stats.display()))
        .arg("--insts")
        .assert()
        .failure()
        .code(56);
    assert!(!stats.exists());
}
