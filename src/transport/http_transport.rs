use crate::config::OpenAIConfig;
use crate::errors::{NetworkError, OpenAIError, OpenAIResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, StreamingResponse};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, instrument};

/// HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    config: OpenAIConfig,
}

impl ReqwestTransport {
    pub fn new(config: &OpenAIConfig) -> OpenAIResult<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            OpenAIError::Network(NetworkError::ConnectionFailed(format!(
                "Failed to build HTTP client: {}",
                e
            )))
        })?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn execute(&self, request: HttpRequest) -> OpenAIResult<reqwest::Response> {
        let url = self.config.endpoint_url(&request.path);

        let mut builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        debug!(
            status = response.status().as_u16(),
            content_type = ?response.headers().get(http::header::CONTENT_TYPE),
            "Received response headers"
        );
        Ok(response)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: HttpRequest) -> OpenAIResult<HttpResponse> {
        let response = self.execute(request).await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(bytes = body.len(), "Read response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send_streaming(&self, request: HttpRequest) -> OpenAIResult<StreamingResponse> {
        let response = self.execute(request).await?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(OpenAIError::from));

        Ok(StreamingResponse {
            status,
            headers,
            stream: Box::pin(stream),
        })
    }
}
