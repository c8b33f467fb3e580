use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cinder() -> Command {
    let mut cmd = Command::cargo_bin("cinder").unwrap();
    cmd.env_remove("CINDER_ROOT").env_remove("CINDER_MAX_DEPTH");
    cmd
}

#[test]
fn run_expr_prints_the_final_value() {
    cinder()
        .args(["run", "--expr", "(+ 1 2)"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn run_expr_with_nil_result_prints_only_script_output() {
    cinder()
        .args(["run", "-e", "(println \"hello\" 42)"])
        .assert()
        .success()
        .stdout("hello42\n");
}

#[test]
fn run_file_includes_module_from_root() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("greet.txt"),
        "(def greet (lambda (name) (concat \"hi \" name)))\r\n",
    )
    .unwrap();
    let script = dir.path().join("main.txt");
    fs::write(&script, "(include greet)\n(println (greet.greet \"bob\"))\n").unwrap();

    cinder()
        .arg("--root")
        .arg(dir.path())
        .arg("run")
        .arg(&script)
        .assert()
        .success()
        .stdout("hi bob\n");
}

#[test]
fn root_can_come_from_the_environment() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("consts.txt"), "(def answer 42)").unwrap();

    cinder()
        .env("CINDER_ROOT", dir.path())
        .args(["run", "-e", "(include consts) consts.answer"])
        .assert()
        .success()
        .stdout("42\n");
}

#[test]
fn fs_module_writes_under_root() {
    let dir = TempDir::new().unwrap();

    cinder()
        .arg("--root")
        .arg(dir.path())
        .args(["run", "-e", "(include fs) (fs.write \"out.txt\" \"saved\")"])
        .assert()
        .success()
        .stdout("1\n");
    assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "saved");
}

#[test]
fn sys_exit_ends_the_run_successfully() {
    cinder()
        .args(["run", "-e", "(include sys) (println 1) (sys.exit) (println 2)"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn depth_limit_aborts_runaway_recursion() {
    cinder()
        .env("CINDER_MAX_DEPTH", "50")
        .args(["run", "-e", "(def f (lambda (n) (f n))) (f 0)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nested deeper than 50"));
}

#[test]
fn default_depth_limit_stops_cleanly() {
    cinder()
        .args(["run", "-e", "(def f (lambda (n) (f (+ n 1)))) (f 0)"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nested deeper than 2048"));
}

#[test]
fn deep_recursion_with_a_raised_limit_finishes() {
    cinder()
        .args([
            "--max-depth",
            "100000",
            "run",
            "-e",
            "(def count (lambda (n) (if (< n 1) 0 (+ 1 (count (- n 1)))))) (count 20000)",
        ])
        .assert()
        .success()
        .stdout("20000\n");
}

#[test]
fn missing_script_file_fails() {
    let dir = TempDir::new().unwrap();
    cinder()
        .arg("run")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read script"));
}

#[test]
fn no_subcommand_prints_help() {
    cinder()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
