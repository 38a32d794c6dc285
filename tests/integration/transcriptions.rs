//! Integration tests for audio transcription

use super::*;
use openai_cli::dispatch::{OutputMode, ResponseDispatcher};
use openai_cli::options::TranscriptionOptions;
use openai_cli::services::audio::{AudioResponseFormat, AudioServiceImpl, TranscriptionOutput};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_string_contains, header_regex};

fn audio_file() -> NamedTempFile {
    let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    std::fs::write(file.path(), b"RIFF....WAVEfmt ").unwrap();
    file
}

#[tokio::test]
async fn test_transcription_multipart_request() {
    let server = setup_mock_server().await;
    mock_with_auth("audio/transcriptions")
        .and(header_regex("content-type", "^multipart/form-data; boundary=.+"))
        .and(body_string_contains("name=\"model\"\r\n\r\nwhisper-1"))
        .and(body_string_contains("name=\"response_format\"\r\n\r\njson"))
        .and(body_string_contains("name=\"language\"\r\n\r\nnl"))
        .and(body_string_contains("Content-Type: audio/wav"))
        .and(body_string_contains("RIFF....WAVEfmt "))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Goedemorgen."})))
        .expect(1)
        .mount(&server)
        .await;

    let file = audio_file();
    let mut options = TranscriptionOptions::new(file.path()).with_api_key(TEST_API_KEY);
    options.language = Some("nl".to_string());

    let service = AudioServiceImpl::new(transport_for(&server));
    let mut dispatcher = ResponseDispatcher::new(Vec::new(), OutputMode::Text);
    let output = dispatcher
        .dispatch_transcription(&service, &options)
        .await
        .unwrap();

    assert_eq!(output, TranscriptionOutput::Json(json!({"text": "Goedemorgen."})));
    assert_eq!(String::from_utf8(dispatcher.into_inner()).unwrap(), "Goedemorgen.\n");
}

#[tokio::test]
async fn test_transcription_srt_is_printed_verbatim() {
    let server = setup_mock_server().await;
    let srt = "1\n00:00:00,000 --> 00:00:02,000\nGood morning.\n\n";
    mock_with_auth("audio/transcriptions")
        .and(body_string_contains("name=\"response_format\"\r\n\r\nsrt"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(srt.as_bytes().to_vec(), "text/plain"))
        .mount(&server)
        .await;

    let file = audio_file();
    let options = TranscriptionOptions::new(file.path())
        .with_api_key(TEST_API_KEY)
        .with_response_format(AudioResponseFormat::Srt);

    let service = AudioServiceImpl::new(transport_for(&server));
    let mut dispatcher = ResponseDispatcher::new(Vec::new(), OutputMode::Text);
    dispatcher
        .dispatch_transcription(&service, &options)
        .await
        .unwrap();

    assert_eq!(String::from_utf8(dispatcher.into_inner()).unwrap(), srt);
}

#[tokio::test]
async fn test_transcription_error_surfaces_body() {
    let server = setup_mock_server().await;
    mock_with_auth("audio/transcriptions")
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Audio file is too short.", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let file = audio_file();
    let options = TranscriptionOptions::new(file.path()).with_api_key(TEST_API_KEY);

    let service = AudioServiceImpl::new(transport_for(&server));
    let mut dispatcher = ResponseDispatcher::new(Vec::new(), OutputMode::Json);
    let err = dispatcher
        .dispatch_transcription(&service, &options)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert!(err.surfaced_body().unwrap().contains("Audio file is too short."));
}
