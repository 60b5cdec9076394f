use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("tgmark")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_convert_reads_stdin() {
    let home = tempdir().unwrap();
    let output = cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .arg("convert")
        .write_stdin("Hello **world** 🎉")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["text"], "Hello world 🎉");
    assert_eq!(json["entities"][0]["type"], "bold");
    assert_eq!(json["entities"][0]["offset"], 6);
    assert_eq!(json["entities"][0]["length"], 5);
}

#[test]
fn test_convert_reads_file_and_respects_no_latex() {
    let home = tempdir().unwrap();
    let input = home.path().join("math.md");
    fs::write(&input, r"\(\alpha + \beta\)").unwrap();

    let output = cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .arg("convert")
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["text"], "$α + β$");

    let output = cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .args(["convert", "--no-latex"])
        .arg(&input)
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["text"], r"(\alpha + \beta)");
}

#[test]
fn test_convert_missing_file_fails() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .args(["convert", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.md"));
}

#[test]
fn test_split_with_max_length() {
    let home = tempdir().unwrap();
    let output = cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .args(["split", "--max-length", "5"])
        .write_stdin("aaa\nbbb\nccc")
        .output()
        .unwrap();

    assert!(output.status.success());
    let json = stdout_json(&output);
    let texts: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|chunk| chunk["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["aaa", "bbb", "ccc"]);
}

#[test]
fn test_process_writes_attachments() {
    let home = tempdir().unwrap();
    let out_dir = home.path().join("out");
    let config_path = home.path().join("custom.toml");
    fs::write(&config_path, "[mermaid]\nenabled = false\n").unwrap();

    let code = (1..=60)
        .map(|n| format!("print({n})"))
        .collect::<Vec<_>>()
        .join("\n");
    let markdown = format!("Intro\n\n```python\n{code}\n```\n\n```mermaid\ngraph TD\n```\n\nEnd");

    let output = cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .arg("--config")
        .arg(&config_path)
        .arg("process")
        .arg("--out-dir")
        .arg(&out_dir)
        .write_stdin(markdown)
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    let json = stdout_json(&output);
    let items = json.as_array().unwrap();
    let types: Vec<_> = items.iter().map(|item| item["type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["text", "file", "file", "text"]);

    assert_eq!(items[1]["file_name"], "readable.py");
    assert_eq!(items[1]["language"], "python");
    assert_eq!(items[2]["file_name"], "invalid_mermaid.txt");
    assert_eq!(items[2]["source"], "diagram");

    assert_eq!(
        fs::read_to_string(out_dir.join("01-readable.py")).unwrap(),
        code
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("02-invalid_mermaid.txt")).unwrap(),
        "graph TD"
    );
}

#[test]
fn test_config_path_command() {
    let home = tempdir().unwrap();
    cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_path_honors_override() {
    cargo_bin_cmd!("tgmark")
        .args(["config", "path", "--config", "/tmp/elsewhere.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("elsewhere.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let home = tempdir().unwrap();
    let config_path = home.path().join("config.toml");

    cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[render]"));
    assert!(contents.contains("max_message_length = 4096"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let home = tempdir().unwrap();
    fs::write(home.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("tgmark")
        .env("TGMARK_HOME", home.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_generate_prints_defaults() {
    cargo_bin_cmd!("tgmark")
        .args(["config", "generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[render.symbols]"))
        .stdout(predicate::str::contains("base_url = \"https://mermaid.ink\""));
}
