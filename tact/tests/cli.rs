//! Subprocess-level checks for the `tact` binary, run through `assert_cmd`
//! rather than calling `commands::*` in-process (those are covered by the
//! `#[cfg(test)]` blocks alongside each command).

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn run_prints_interpreter_stdout() {
    let file = source_file("x = 1 + 2\nprint(x)\n");

    Command::cargo_bin("tact")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3"));
}

#[test]
fn run_on_a_semantic_error_exits_nonzero() {
    let file = source_file("y = undefined + 1\n");

    Command::cargo_bin("tact")
        .unwrap()
        .arg("run")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("undefined"));
}

#[test]
fn emit_tac_writes_a_listing_containing_print() {
    let file = source_file("x = 1 + 2\nprint(x)\n");

    Command::cargo_bin("tact")
        .unwrap()
        .arg("emit")
        .arg(file.path())
        .arg("tac")
        .assert()
        .success()
        .stdout(predicate::str::contains("print("));
}

#[test]
fn emit_asm_includes_a_function_label_for_a_defined_function() {
    let file = source_file("def f(n):\n    return n + 1\nprint(f(1))\n");

    Command::cargo_bin("tact")
        .unwrap()
        .arg("emit")
        .arg(file.path())
        .arg("asm")
        .assert()
        .success()
        .stdout(predicate::str::contains("func_f:"));
}

#[test]
fn emit_without_a_kind_falls_back_to_the_config_files_default_emit() {
    let file = source_file("x = 1 + 2\nprint(x)\n");
    let config = config_file("default_emit = \"ast\"\n");

    Command::cargo_bin("tact")
        .unwrap()
        .arg("--config")
        .arg(config.path())
        .arg("emit")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Assignment"));
}

#[test]
fn run_on_a_missing_file_exits_nonzero() {
    Command::cargo_bin("tact")
        .unwrap()
        .arg("run")
        .arg("/nonexistent/no-such-file.tac")
        .assert()
        .failure();
}
