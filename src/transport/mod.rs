//! HTTP transport layer.
//!
//! Provides the transport abstraction, the request descriptor built by the
//! services, and the incremental SSE decoding used for streamed responses.

mod http_transport;
mod multipart;
mod request_builder;
mod streaming;

pub use http_transport::ReqwestTransport;
pub use multipart::MultipartForm;
pub use request_builder::RequestBuilder;
pub use streaming::{
    is_event_stream, LineBuffer, SseDecoder, SseEvent, SseLine, SseStream, StreamResult,
    DATA_PREFIX, DONE_SENTINEL,
};

use crate::errors::{OpenAIError, OpenAIResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::{header, HeaderMap, Method};
use serde::de::DeserializeOwned;
use std::pin::Pin;

/// Raw response body chunks as they arrive from the network.
pub type ByteStream = Pin<Box<dyn Stream<Item = OpenAIResult<Bytes>> + Send>>;

/// A fully described outbound request. Building one performs no I/O.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `chat/completions`.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, header::CONTENT_TYPE)
    }
}

/// A response whose body has been read to the end.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    /// Returns true if the status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, header::CONTENT_TYPE)
    }

    /// Parses the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> OpenAIResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            OpenAIError::Deserialization(format!(
                "Failed to deserialize response: {}. Body: {}",
                e,
                String::from_utf8_lossy(&self.body)
            ))
        })
    }
}

/// A response whose body is still arriving.
pub struct StreamingResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub stream: ByteStream,
}

impl StreamingResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        header_str(&self.headers, header::CONTENT_TYPE)
    }

    /// Drains the remaining body. Used when the response turns out not to be
    /// a stream and its content is only needed for error reporting.
    pub async fn into_body(mut self) -> OpenAIResult<Bytes> {
        let mut body = Vec::new();
        while let Some(chunk) = self.stream.next().await {
            body.extend_from_slice(&chunk?);
        }
        Ok(Bytes::from(body))
    }
}

impl std::fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and waits for the complete body.
    async fn send(&self, request: HttpRequest) -> OpenAIResult<HttpResponse>;

    /// Sends a request and hands back the body as it arrives.
    async fn send_streaming(&self, request: HttpRequest) -> OpenAIResult<StreamingResponse>;
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
