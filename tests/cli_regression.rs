// Regression tests: the CLI rewrites files and renders errors as miette diagnostics.
// Requires: assert_cmd, predicates, tempfile crates in [dev-dependencies]

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const KERNEL: &str = "\
N = 4

def kernel(out):
    for i in range(N):
        out[i] = i
";

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn astrewrite() -> Command {
    Command::cargo_bin("astrewrite").unwrap()
}

#[test]
fn cli_rewrites_a_function_by_factor() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "kernel.py", KERNEL);

    astrewrite()
        .args(["rewrite", "--function", "kernel", "--pass", "unroll_by_factor=2"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            "\
def kernel(out):
    for i in range(0, 4, 2):
        out[i + 0] = i + 0
        out[i + 1] = i + 1
",
        );
}

#[test]
fn cli_defaults_to_full_unroll_and_accepts_defines() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "k.py",
        "def k():\n    for i in unroll(range(M)):\n        g(i)\n",
    );

    astrewrite()
        .args(["rewrite", "-D", "M=2"])
        .arg(&file)
        .assert()
        .success()
        .stdout("def k():\n    g(0)\n    g(1)\n");
}

#[test]
fn cli_reads_pipeline_config() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "kernel.py", KERNEL);
    let config = write(
        &dir,
        "pipeline.yaml",
        "passes:\n  - pass: unroll_by_factor\n    factor: 4\n",
    );

    astrewrite()
        .args(["rewrite", "-f", "kernel", "--config"])
        .arg(&config)
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("for i in range(0, 4, 4):").and(contains("out[i + 3] = i + 3")));
}

#[test]
fn cli_reports_miette_diagnostics_on_rewrite_error() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "kernel.py", KERNEL);

    astrewrite()
        .args(["rewrite", "--pass", "unroll_by_factor=3"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(
            contains("astrewrite::unroll::factor_not_divisible")
                .and(contains("pass `unroll_by_factor` failed")),
        );
}

#[test]
fn cli_reports_miette_diagnostics_on_syntax_error() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "bad.py", "x = = 1\n");

    astrewrite()
        .args(["format"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("astrewrite::syntax::invalid"));
}

#[test]
fn cli_rejects_bad_pass_specs() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "kernel.py", KERNEL);

    astrewrite()
        .args(["rewrite", "--pass", "vectorize"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("astrewrite::config::pass"));
}

#[test]
fn cli_trace_shows_each_pass() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "kernel.py", KERNEL);

    astrewrite()
        .args(["trace", "-f", "kernel", "-p", "unroll", "-p", "unroll_by_factor=2"])
        .arg(&file)
        .assert()
        .success()
        .stdout(
            contains("--- Step 0: input ---")
                .and(contains("--- Step 1: unroll ---"))
                .and(contains("(no changes)"))
                .and(contains("--- Step 2: unroll_by_factor ---"))
                .and(contains("+    for i in range(0, 4, 2):")),
        );
}

#[test]
fn cli_prints_ast_as_json() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "kernel.py", KERNEL);

    astrewrite()
        .args(["ast", "--function", "kernel"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("\"FunctionDef\"").and(contains("\"kernel\"")));
}

#[test]
fn cli_formats_source() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "messy.py", "x  =  ( 1 +\n  2 )   # sum\n");

    astrewrite()
        .arg("format")
        .arg(&file)
        .assert()
        .success()
        .stdout("x = 1 + 2\n");
}
