use crate::auth::ApiKeyProvider;
use crate::errors::{ErrorMapper, OpenAIError, OpenAIResult};
use crate::options::TranscriptionOptions;
use crate::services::audio::TranscriptionOutput;
use crate::transport::{HttpRequest, HttpTransport, MultipartForm, RequestBuilder};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const TRANSCRIPTIONS_PATH: &str = "audio/transcriptions";

/// Builds the multipart transcription request around already-read audio
/// bytes. Pure: performs no I/O.
pub fn build_transcription_request(
    options: &TranscriptionOptions,
    filename: &str,
    audio: Bytes,
) -> OpenAIResult<HttpRequest> {
    build_transcription_request_with(options, filename, audio, MultipartForm::new())
}

pub(crate) fn build_transcription_request_with(
    options: &TranscriptionOptions,
    filename: &str,
    audio: Bytes,
    form: MultipartForm,
) -> OpenAIResult<HttpRequest> {
    let auth = ApiKeyProvider::resolve(options.api_key.as_ref())?;

    let form = form
        .text("model", options.model.as_str())
        .text_opt("prompt", options.prompt.as_deref())
        .text("response_format", options.response_format.as_str())
        .text("temperature", options.temperature.to_string())
        .text_opt("language", options.language.as_deref())
        .file("file", filename, detect_content_type(filename), audio);

    let builder = auth.apply(RequestBuilder::post(TRANSCRIPTIONS_PATH))?;
    Ok(builder.multipart(form)?.build())
}

fn detect_content_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "mp4" | "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        _ => "application/octet-stream",
    }
}

#[async_trait]
pub trait AudioService: Send + Sync {
    async fn transcribe(&self, options: &TranscriptionOptions) -> OpenAIResult<TranscriptionOutput>;
}

pub struct AudioServiceImpl {
    transport: Arc<dyn HttpTransport>,
}

impl AudioServiceImpl {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl AudioService for AudioServiceImpl {
    #[instrument(skip_all, fields(model = %options.model, format = %options.response_format))]
    async fn transcribe(&self, options: &TranscriptionOptions) -> OpenAIResult<TranscriptionOutput> {
        let audio = tokio::fs::read(&options.file)
            .await
            .map_err(|e| OpenAIError::io(&options.file, e))?;
        let filename = options
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        debug!(file = %filename, bytes = audio.len(), "Uploading audio");

        let request = build_transcription_request(options, &filename, Bytes::from(audio))?;
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(ErrorMapper::from_response(response.status, &response.body));
        }

        if options.response_format.is_json() {
            Ok(TranscriptionOutput::Json(response.json()?))
        } else {
            Ok(TranscriptionOutput::Text(
                String::from_utf8_lossy(&response.body).into_owned(),
            ))
        }
    }
}
