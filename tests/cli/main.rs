//! End-to-end tests of the `openai` binary: exit codes and what lands on
//! stdout and stderr.

use serde_json::json;
use std::path::Path;
use std::process::{Command, Output};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_API_KEY: &str = "sk-cli";

/// Runs the binary with a clean environment pointed at `base_url`.
async fn openai(args: &[&str], base_url: Option<String>, cwd: &Path) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let cwd = cwd.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut command = Command::new(env!("CARGO_BIN_EXE_openai"));
        command
            .args(&args)
            .current_dir(cwd)
            .env_remove("OPENAI_API_KEY")
            .env_remove("OPENAI_MODEL")
            .env_remove("OPENAI_BASE_URL")
            .env_remove("OPENAI_TIMEOUT")
            .env_remove("RUST_LOG")
            .env("TERM", "dumb");
        if let Some(base_url) = base_url {
            command.env("OPENAI_BASE_URL", base_url);
        }
        command.output().unwrap()
    })
    .await
    .unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upstream_error_exits_1_and_surfaces_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid key"})))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let output = openai(
        &["chat", "-k", TEST_API_KEY, "-s", "sys", "-u", "hi"],
        Some(format!("{}/v1", server.uri())),
        dir.path(),
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(text(&output.stdout), "");
    assert_eq!(
        text(&output.stderr),
        "Upstream error: HTTP 401 - invalid key\n{\"error\":\"invalid key\"}\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stream_prints_deltas_and_exits_0() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\ndata: [DONE]\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let output = openai(
        &["chat", "-k", TEST_API_KEY, "-s", "sys", "-u", "hi", "--stream"],
        Some(format!("{}/v1", server.uri())),
        dir.path(),
    )
    .await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(text(&output.stdout), "Hi\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_options_exit_1_with_help() {
    let dir = tempfile::tempdir().unwrap();

    let output = openai(&["chat", "-s", "sys"], None, dir.path()).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        text(&output.stderr),
        "Missing required options: api_key, user_prompt\n"
    );
    let stdout = text(&output.stdout);
    assert!(stdout.starts_with('\n'));
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--system-prompt"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blank_api_key_is_reported_as_missing() {
    let dir = tempfile::tempdir().unwrap();

    let output = openai(&["chat", "-k", "", "-s", "sys", "-u", "hi"], None, dir.path()).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(text(&output.stderr), "Missing required options: api_key\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_write_options_saves_and_exits_0() {
    let dir = tempfile::tempdir().unwrap();

    let output = openai(
        &["chat", "-m", "gpt-4", "-k", TEST_API_KEY, "-w", "saved.json"],
        None,
        dir.path(),
    )
    .await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(text(&output.stdout), "Options saved to 'saved.json'.\n");
    assert_eq!(text(&output.stderr), "");

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("saved.json")).unwrap())
            .unwrap();
    assert_eq!(saved["model"], "gpt-4");
    assert!(saved.get("api_key").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_help_exits_0() {
    let dir = tempfile::tempdir().unwrap();

    let output = openai(&["--help"], None, dir.path()).await;

    assert_eq!(output.status.code(), Some(0));
    assert!(text(&output.stdout).contains("transcribe"));
}
