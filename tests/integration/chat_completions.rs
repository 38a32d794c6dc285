//! Integration tests for chat completions

use super::*;
use openai_cli::dispatch::{ChatOutcome, OutputMode, ResponseDispatcher};
use openai_cli::errors::OpenAIError;
use openai_cli::options::ChatOptions;
use openai_cli::services::chat::ChatCompletionServiceImpl;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::body_partial_json;

fn options() -> ChatOptions {
    ChatOptions::new("gpt-3.5-turbo", "You are terse.", "Greet me").with_api_key(TEST_API_KEY)
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-integration-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

async fn run(
    server: &MockServer,
    options: &ChatOptions,
    mode: OutputMode,
) -> (Result<ChatOutcome, OpenAIError>, String) {
    let service = ChatCompletionServiceImpl::new(transport_for(server));
    let mut dispatcher = ResponseDispatcher::new(Vec::new(), mode);
    let outcome = dispatcher.dispatch_chat(&service, options).await;
    let output = String::from_utf8(dispatcher.into_inner()).unwrap();
    (outcome, output)
}

#[tokio::test]
async fn test_chat_completion_prints_content() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .and(body_partial_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "You are terse."},
                {"role": "user", "content": "Greet me"}
            ],
            "max_tokens": 1000,
            "n": 1,
            "stop": null,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello.")))
        .expect(1)
        .mount(&server)
        .await;

    let (outcome, output) = run(&server, &options(), OutputMode::Text).await;

    assert!(matches!(outcome, Ok(ChatOutcome::Completed(_))));
    assert_eq!(output, "Hello.\n");
}

#[tokio::test]
async fn test_chat_completion_json_output() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello.")))
        .mount(&server)
        .await;

    let (_, output) = run(&server, &options().with_json(true), OutputMode::Json).await;

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed, completion_body("Hello."));
}

#[tokio::test]
async fn test_chat_completion_authentication_error() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid key"})))
        .mount(&server)
        .await;

    let (outcome, output) = run(&server, &options(), OutputMode::Text).await;

    match outcome {
        Err(OpenAIError::Upstream {
            status_code,
            message,
            body,
        }) => {
            assert_eq!(status_code, 401);
            assert_eq!(message, "invalid key");
            assert_eq!(body, r#"{"error":"invalid key"}"#);
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert_eq!(output, "");
}

#[tokio::test]
async fn test_chat_stream_prints_deltas() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(event_stream(concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n",
            "data: [DONE]\n",
        )))
        .mount(&server)
        .await;

    let (outcome, output) = run(&server, &options().with_stream(true), OutputMode::Text).await;

    match outcome {
        Ok(ChatOutcome::Streamed(result)) => assert_eq!(result.len(), 1),
        other => panic!("expected streamed outcome, got {other:?}"),
    }
    assert_eq!(output, "Hi\n");
}

#[tokio::test]
async fn test_chat_stream_json_array() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .respond_with(event_stream(concat!(
            ": keep-alive\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\r\n\r\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"never\":\"seen\"}\n\n",
        )))
        .mount(&server)
        .await;

    let options = options().with_stream(true).with_json(true);
    let (outcome, output) = run(&server, &options, OutputMode::Json).await;

    assert!(outcome.is_ok());
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(
        parsed,
        json!([
            {"choices": [{"delta": {"content": "Hel"}}]},
            {"choices": [{"delta": {"content": "lo"}}]}
        ])
    );
}

#[tokio::test]
async fn test_chat_stream_unexpected_content_type() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": {"message": "streaming disabled"}})),
        )
        .mount(&server)
        .await;

    let (outcome, output) = run(&server, &options().with_stream(true), OutputMode::Json).await;

    match outcome {
        Err(OpenAIError::UnexpectedContentType { content_type, body }) => {
            assert!(content_type.starts_with("application/json"));
            assert_eq!(body, Some(json!({"error": {"message": "streaming disabled"}})));
        }
        other => panic!("expected content type error, got {other:?}"),
    }
    assert_eq!(output, "");
}

#[tokio::test]
async fn test_chat_stream_malformed_event() {
    let server = setup_mock_server().await;
    mock_with_auth("chat/completions")
        .respond_with(event_stream(concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
            "data: {not json}\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        )))
        .mount(&server)
        .await;

    let (outcome, output) = run(&server, &options().with_stream(true), OutputMode::Text).await;

    assert!(matches!(outcome, Err(OpenAIError::MalformedEvent { .. })));
    assert_eq!(output, "ok");
}
