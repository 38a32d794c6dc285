use crate::auth::ApiKeyProvider;
use crate::errors::{ErrorMapper, OpenAIError, OpenAIResult};
use crate::options::ChatOptions;
use crate::services::chat::ChatCompletionRequest;
use crate::transport::{
    is_event_stream, ByteStream, HttpRequest, HttpTransport, RequestBuilder, SseStream,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Decoded events of a streamed completion.
pub type ChatCompletionStream = SseStream<ByteStream>;

/// Builds the chat completion request for `options`, honouring its stream
/// flag. Pure: performs no I/O.
pub fn build_chat_request(options: &ChatOptions) -> OpenAIResult<HttpRequest> {
    build_request(options, options.stream)
}

fn build_request(options: &ChatOptions, stream: bool) -> OpenAIResult<HttpRequest> {
    let auth = ApiKeyProvider::resolve(options.api_key.as_ref())?;

    let mut body = ChatCompletionRequest::from_options(options);
    body.stream = stream;

    let builder = auth.apply(RequestBuilder::post(CHAT_COMPLETIONS_PATH))?;
    Ok(builder.json(&body)?.build())
}

#[async_trait]
pub trait ChatCompletionService: Send + Sync {
    /// Issues a non-streaming request and returns the decoded document.
    async fn create(&self, options: &ChatOptions) -> OpenAIResult<serde_json::Value>;

    /// Issues a streaming request. The returned stream yields one event per
    /// `data:` payload.
    async fn create_stream(&self, options: &ChatOptions) -> OpenAIResult<ChatCompletionStream>;
}

pub struct ChatCompletionServiceImpl {
    transport: Arc<dyn HttpTransport>,
}

impl ChatCompletionServiceImpl {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ChatCompletionService for ChatCompletionServiceImpl {
    #[instrument(skip_all, fields(model = %options.model))]
    async fn create(&self, options: &ChatOptions) -> OpenAIResult<serde_json::Value> {
        let request = build_request(options, false)?;
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(ErrorMapper::from_response(response.status, &response.body));
        }

        debug!(status = response.status, "Chat completion succeeded");
        response.json()
    }

    #[instrument(skip_all, fields(model = %options.model))]
    async fn create_stream(&self, options: &ChatOptions) -> OpenAIResult<ChatCompletionStream> {
        let request = build_request(options, true)?;
        let response = self.transport.send_streaming(request).await?;

        if !response.is_success() {
            let status = response.status;
            let body = response.into_body().await.unwrap_or_default();
            return Err(ErrorMapper::from_response(status, &body));
        }

        if !is_event_stream(response.content_type()) {
            let content_type = response.content_type().unwrap_or("<none>").to_string();
            let body = response
                .into_body()
                .await
                .ok()
                .and_then(|body| serde_json::from_slice(&body).ok());
            warn!(content_type = %content_type, "Streaming request did not return an event stream");
            return Err(OpenAIError::UnexpectedContentType { content_type, body });
        }

        debug!("Chat completion stream opened");
        Ok(SseStream::new(response.stream))
    }
}
