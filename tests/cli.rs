//! End-to-end checks of the compiled binary: exit codes, stdout/stderr split,
//! and the files each subcommand leaves behind. Nothing here reaches the
//! network; generation is only exercised up to the point where it must fail.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn prompt2image(root: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_prompt2image"));
    cmd.arg("--root").arg(root).args(args).env_remove("RUST_LOG");
    cmd
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("binary should start")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn generate_missing_prompt_fails_without_writing() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("prompts/nope.txt");

    let output = run(prompt2image(tmp.path(), &["generate", missing.to_str().unwrap()])
        .env("GEMINI_API_KEY", "test-key"));

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("error: prompt file not found"));
    assert!(!tmp.path().join("outputs").exists());
}

#[test]
fn generate_without_credential_fails_first() {
    let tmp = TempDir::new().unwrap();
    let prompts = tmp.path().join("prompts");
    fs::create_dir(&prompts).unwrap();
    fs::write(prompts.join("sunset.txt"), "A red sunset").unwrap();

    let output = run(prompt2image(
        tmp.path(),
        &["generate", prompts.join("sunset.txt").to_str().unwrap()],
    )
    .env_remove("GEMINI_API_KEY"));

    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("GEMINI_API_KEY"));
    assert!(!tmp.path().join("outputs").exists());
}

#[test]
fn missing_credential_wins_over_missing_prompt() {
    let tmp = TempDir::new().unwrap();
    let output = run(prompt2image(tmp.path(), &["generate", "does-not-exist.txt"])
        .env_remove("GEMINI_API_KEY"));
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn new_without_credential_saves_nothing() {
    let tmp = TempDir::new().unwrap();
    let output = run(prompt2image(tmp.path(), &["new", "A lighthouse at dusk"])
        .env_remove("GEMINI_API_KEY"));

    assert_eq!(output.status.code(), Some(3));
    assert!(!tmp.path().join("prompts").exists());
}

#[test]
fn gallery_on_empty_project() {
    let tmp = TempDir::new().unwrap();
    let output = run(&mut prompt2image(tmp.path(), &["gallery"]));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("docs/index.html"));
    let html = fs::read_to_string(tmp.path().join("docs/index.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
}

#[test]
fn gallery_json_report() {
    let tmp = TempDir::new().unwrap();
    let prompts = tmp.path().join("prompts");
    fs::create_dir(&prompts).unwrap();
    fs::write(prompts.join("sunset.txt"), "A red sunset").unwrap();
    fs::write(prompts.join("forest.txt"), "A misty forest").unwrap();

    let output = run(&mut prompt2image(tmp.path(), &["--json", "gallery"]));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["prompts"], 2);
    assert_eq!(report["images"], 0);
}

#[test]
fn gallery_path_flag_overrides_config() {
    let tmp = TempDir::new().unwrap();
    let output = run(&mut prompt2image(
        tmp.path(),
        &["gallery", "--gallery", "site/gallery.html"],
    ));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(tmp.path().join("site/gallery.html").exists());
    assert!(!tmp.path().join("docs").exists());
}

#[test]
fn gallery_is_byte_identical_on_rebuild() {
    let tmp = TempDir::new().unwrap();
    let prompts = tmp.path().join("prompts");
    fs::create_dir(&prompts).unwrap();
    fs::write(prompts.join("sunset.txt"), "A red sunset").unwrap();

    run(&mut prompt2image(tmp.path(), &["gallery"]));
    let first = fs::read(tmp.path().join("docs/index.html")).unwrap();
    run(&mut prompt2image(tmp.path(), &["gallery"]));
    let second = fs::read(tmp.path().join("docs/index.html")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn view_prompt_prints_prompt_text() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("prompts")).unwrap();
    fs::create_dir(tmp.path().join("outputs")).unwrap();
    fs::write(tmp.path().join("prompts/sunset.txt"), "A red sunset").unwrap();
    fs::write(tmp.path().join("outputs/sunset_20240102_090000.png"), b"png").unwrap();

    let output = run(&mut prompt2image(tmp.path(), &["view-prompt", "sunset_2024"]));

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("sunset_20240102_090000.png"));
    assert!(out.contains("A red sunset"));
}

#[test]
fn view_prompt_unknown_image_lists_recent() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("outputs")).unwrap();
    fs::write(tmp.path().join("outputs/sunset_20240102_090000.png"), b"png").unwrap();

    let output = run(&mut prompt2image(tmp.path(), &["view-prompt", "moon"]));

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).contains("sunset_20240102_090000.png"));
    assert!(stderr(&output).contains("moon"));
}

#[test]
fn invalid_config_exits_with_config_code() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("prompt2image.toml"),
        "[generation]\ntimeout_secs = 0\n",
    )
    .unwrap();

    let output = run(&mut prompt2image(tmp.path(), &["gallery"]));
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn gen_config_prints_loadable_toml() {
    let tmp = TempDir::new().unwrap();
    let output = run(&mut prompt2image(tmp.path(), &["gen-config"]));
    assert!(output.status.success());

    fs::write(tmp.path().join("prompt2image.toml"), stdout(&output)).unwrap();
    let output = run(&mut prompt2image(tmp.path(), &["gallery"]));
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}
