//! Integration tests for the `deichwave` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! without a box; the remaining tests talk to a wiremock stand-in.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `deichwave` binary with env isolation.
///
/// Clears all `DEICHWAVE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn deichwave_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("deichwave");
    cmd.env("HOME", "/tmp/deichwave-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/deichwave-cli-test-nonexistent")
        .env_remove("DEICHWAVE_HOST")
        .env_remove("DEICHWAVE_CONFIG")
        .env_remove("DEICHWAVE_OUTPUT")
        .env_remove("DEICHWAVE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A stand-in box answering the liveness probe.
async fn mock_box() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Pong")))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_blocking(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = deichwave_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    deichwave_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Deichwave")
            .and(predicate::str::contains("music"))
            .and(predicate::str::contains("lights"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    deichwave_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deichwave"));
}

#[test]
fn test_volume_out_of_range_is_usage_error() {
    deichwave_cmd()
        .args(["volume", "150"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("150"));
}

#[test]
fn test_invalid_host_is_rejected() {
    let output = deichwave_cmd()
        .args(["--host", "ftp://box", "ping"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("hosts"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    deichwave_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deichwave"));
}

#[test]
fn test_completions_zsh() {
    deichwave_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("custom.toml");
    deichwave_cmd()
        .args(["config", "path", "--config"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("nested").join("config.toml");

    deichwave_cmd()
        .args(["config", "init", "--config"])
        .arg(&file)
        .assert()
        .success();
    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.contains("hosts"));
    assert!(written.contains("192.168.188.10"));

    deichwave_cmd()
        .args(["config", "init", "--config"])
        .arg(&file)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("--force"));

    deichwave_cmd()
        .args(["config", "init", "--force", "--config"])
        .arg(&file)
        .assert()
        .success();
}

#[test]
fn test_config_show_applies_env_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.toml");
    std::fs::write(&file, "hosts = [\"http://10.0.0.5:3000/\"]\n").unwrap();

    let output = deichwave_cmd()
        .env("DEICHWAVE_PROBE_TIMEOUT_MS", "500")
        .args(["config", "show", "-o", "json", "--config"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["hosts"], json!(["http://10.0.0.5:3000/"]));
    assert_eq!(shown["probe_timeout_ms"], json!(500));
    assert_eq!(shown["battery"]["interval_secs"], json!(60));
}

// ── Against a box ───────────────────────────────────────────────────

#[test]
fn test_unreachable_hosts_time_out() {
    let output = deichwave_cmd()
        .args(["--host", "http://127.0.0.1:9/", "--timeout", "1", "ping"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    let text = combined_output(&output);
    assert!(
        text.contains("No Deichwave host answered"),
        "unexpected output:\n{text}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ping_reports_resolved_host() {
    let server = mock_box().await;

    let mut cmd = deichwave_cmd();
    cmd.args(["--host", &server.uri(), "-o", "json", "ping"]);
    let output = run_blocking(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let reply: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reply["reply"], json!("Pong"));
    assert_eq!(reply["host"], json!(format!("{}/", server.uri())));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_volume_set_writes_through() {
    let server = mock_box().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/system/volume"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"level": 20})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v0/system/volume"))
        .and(body_json(json!({"level": 55})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("OK")))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = deichwave_cmd();
    cmd.args(["--host", &server.uri(), "volume", "55"]);
    let output = run_blocking(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Volume set to 55"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_light_effect_is_not_found() {
    let server = mock_box().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/lights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entity": ["strobe"]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = deichwave_cmd();
    cmd.args(["--host", &server.uri(), "lights", "set", "disco"]);
    let output = run_blocking(cmd).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("lights list"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_lights_clear_posts_clear() {
    let server = mock_box().await;
    Mock::given(method("POST"))
        .and(path("/api/v0/lights/clear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("OK")))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = deichwave_cmd();
    cmd.args(["--host", &server.uri(), "lights", "clear"]);
    let output = run_blocking(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Light effects cleared"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_music_list_plain_prints_names() {
    let server = mock_box().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/music"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"entity": ["chill", "party"]})),
        )
        .mount(&server)
        .await;
    for (list, songs) in [("chill", json!(["a"])), ("party", json!(["b", "c"]))] {
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/music/{list}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"entity": songs})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/music/{list}/position")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"position": 1})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v0/music/{list}/chance")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chance": 50})))
            .mount(&server)
            .await;
    }

    let mut cmd = deichwave_cmd();
    cmd.args(["--host", &server.uri(), "-o", "plain", "music", "list"]);
    let output = run_blocking(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "chill\nparty\n");
}
