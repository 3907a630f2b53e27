/*
[INPUT]:  pkgbundle binary, mock bundling service
[OUTPUT]: Exit status and output checks for non-interactive commands
[POS]:    Integration test layer - binary entry point
[UPDATE]: When CLI flags or subcommand output change
*/

mod common;

use std::process::Output;

use common::*;
use serde_json::json;
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const BINARY: &str = env!("CARGO_BIN_EXE_pkgbundle");

async fn run(args: &[&str], envs: &[(&str, String)]) -> Output {
    let mut command = Command::new(BINARY);
    command.args(args).env("RUST_LOG", "error");
    for (key, value) in envs {
        command.env(key, value);
    }
    command.output().await.expect("Failed to start pkgbundle binary")
}

fn describe(output: &Output) -> String {
    format!(
        "status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

#[tokio::test]
async fn cli_mode_with_config_and_dry_run_works() {
    let config_path = format!("{}/demos/pkgbundle.yaml", env!("CARGO_MANIFEST_DIR"));
    let output = run(&["--config", &config_path, "--dry-run"], &[]).await;
    assert!(output.status.success(), "{}", describe(&output));
}

#[tokio::test]
async fn cli_mode_missing_config_fails() {
    let output = run(&["--config", "/nonexistent/pkgbundle.yaml", "--dry-run"], &[]).await;
    assert!(!output.status.success(), "{}", describe(&output));
}

#[tokio::test]
async fn cli_mode_rejects_zero_poll_interval() {
    let output = run(
        &["--dry-run"],
        &[("PKGBUNDLE_POLL_INTERVAL_MS", "0".to_string())],
    )
    .await;
    assert!(!output.status.success(), "{}", describe(&output));
}

#[tokio::test]
async fn cli_mode_tasks_prints_empty_state() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let output = run(&["--base-url", &server.uri(), "tasks"], &[]).await;
    assert!(output.status.success(), "{}", describe(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("no tasks yet"));
}

#[tokio::test]
async fn cli_mode_submit_downloads_archive() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "c1"})))
        .expect(1)
        .mount(&server)
        .await;
    let mut done = task_json("c1", "completed", 100);
    done["archive_path"] = json!("/out/bundle_c1.tar.gz");
    Mock::given(method("GET"))
        .and(path("/api/tasks/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(done))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/download/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tarball".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = temp_dir("cli-submit");
    let output = run(
        &[
            "--base-url",
            &server.uri(),
            "submit",
            "--system-type",
            "rpm",
            "--distribution",
            "centos7",
            "nginx",
        ],
        &[
            ("PKGBUNDLE_DOWNLOAD_DIR", dir.display().to_string()),
            ("PKGBUNDLE_POLL_INTERVAL_MS", "20".to_string()),
            ("PKGBUNDLE_COOLDOWN_MS", "10".to_string()),
        ],
    )
    .await;
    assert!(output.status.success(), "{}", describe(&output));
    assert_eq!(
        std::fs::read(dir.join("bundle_c1.tar.gz")).expect("archive"),
        b"tarball"
    );
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn cli_mode_submit_exits_non_zero_on_task_failure() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "c2"})))
        .mount(&server)
        .await;
    let mut failed = task_json("c2", "failed", 0);
    failed["error"] = json!("no such package: nosuchpkg");
    Mock::given(method("GET"))
        .and(path("/api/tasks/c2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failed))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let output = run(
        &["--base-url", &server.uri(), "submit", "nosuchpkg"],
        &[("PKGBUNDLE_POLL_INTERVAL_MS", "20".to_string())],
    )
    .await;
    assert!(!output.status.success(), "{}", describe(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no such package: nosuchpkg"));
}

#[tokio::test]
async fn cli_mode_failure_reason_cannot_drive_the_terminal() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/api/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "c3"})))
        .mount(&server)
        .await;
    let mut failed = task_json("c3", "failed", 0);
    failed["error"] = json!("\u{1b}[2Jdisk full");
    Mock::given(method("GET"))
        .and(path("/api/tasks/c3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(failed))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let output = run(
        &["--base-url", &server.uri(), "--log-level", "error", "submit", "nginx"],
        &[("PKGBUNDLE_POLL_INTERVAL_MS", "20".to_string())],
    )
    .await;
    assert!(!output.status.success(), "{}", describe(&output));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("disk full"), "{}", describe(&output));
    assert!(!stderr.contains("\u{1b}[2J"), "{}", describe(&output));
}
