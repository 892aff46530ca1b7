// Binary-level checks that exercise argument parsing and the batch
// pre-flight paths. Nothing here talks to the network: the only batch
// runs are ones that stop before any request is scheduled.

use assert_cmd::Command;
use predicates::prelude::*;

fn genai() -> Command {
    Command::cargo_bin("genai").unwrap()
}

#[test]
fn help_lists_command_groups() {
    genai()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("usage"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn batch_process_requires_an_input_argument() {
    genai()
        .args(["batch", "process"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn batch_process_rejects_a_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    genai()
        .args(["batch", "process", "--input"])
        .arg(dir.path().join("missing.txt"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn batch_process_with_empty_input_reports_no_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prompts.txt");
    std::fs::write(&input, "").unwrap();

    genai()
        .args(["batch", "process", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("No prompts found"));
}

#[test]
fn batch_process_rejects_a_non_finite_delay() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("prompts.txt");
    std::fs::write(&input, "hello\n").unwrap();

    genai()
        .args(["batch", "process", "--input"])
        .arg(&input)
        .arg("--output")
        .arg(dir.path().join("out"))
        .args(["--delay", "inf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delay must be"));
}

#[test]
fn config_get_reports_unknown_keys() {
    genai()
        .args(["config", "get", "nonsense"])
        .assert()
        .success()
        .stderr(predicate::str::contains("not found"));
}
