//! Mock HTTP transport for testing

use crate::errors::{OpenAIError, OpenAIResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, StreamingResponse};
use async_trait::async_trait;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses in order and records every request it sees.
#[derive(Clone, Default)]
pub struct MockHttpTransport {
    inner: Arc<Mutex<MockHttpTransportInner>>,
}

#[derive(Default)]
struct MockHttpTransportInner {
    responses: VecDeque<MockResponse>,
    requests: Vec<HttpRequest>,
}

enum MockResponse {
    Body {
        status: u16,
        content_type: &'static str,
        chunks: Vec<Bytes>,
    },
    Error(OpenAIError),
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json_response(self, status: u16, body: serde_json::Value) -> Self {
        self.push(MockResponse::Body {
            status,
            content_type: "application/json",
            chunks: vec![Bytes::from(body.to_string())],
        })
    }

    pub fn with_text_response(self, status: u16, content_type: &'static str, body: &str) -> Self {
        self.push(MockResponse::Body {
            status,
            content_type,
            chunks: vec![Bytes::from(body.to_string())],
        })
    }

    /// A 200 `text/event-stream` response delivered as the given chunks.
    pub fn with_event_stream(self, chunks: Vec<&str>) -> Self {
        self.push(MockResponse::Body {
            status: 200,
            content_type: "text/event-stream",
            chunks: chunks
                .into_iter()
                .map(|c| Bytes::from(c.to_string()))
                .collect(),
        })
    }

    pub fn with_error(self, error: OpenAIError) -> Self {
        self.push(MockResponse::Error(error))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.inner.lock().unwrap().requests.last().cloned()
    }

    fn push(self, response: MockResponse) -> Self {
        self.inner.lock().unwrap().responses.push_back(response);
        self
    }

    fn next(&self, request: HttpRequest) -> OpenAIResult<(u16, HeaderMap, Vec<Bytes>)> {
        let mut inner = self.inner.lock().unwrap();
        inner.requests.push(request);
        match inner.responses.pop_front() {
            Some(MockResponse::Body {
                status,
                content_type,
                chunks,
            }) => {
                let mut headers = HeaderMap::new();
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
                Ok((status, headers, chunks))
            }
            Some(MockResponse::Error(err)) => Err(err),
            None => panic!("MockHttpTransport: no response queued"),
        }
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> OpenAIResult<HttpResponse> {
        let (status, headers, chunks) = self.next(request)?;
        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(chunks.concat()),
        })
    }

    async fn send_streaming(&self, request: HttpRequest) -> OpenAIResult<StreamingResponse> {
        let (status, headers, chunks) = self.next(request)?;
        let stream = futures::stream::iter(chunks.into_iter().map(Ok::<Bytes, OpenAIError>));
        Ok(StreamingResponse {
            status,
            headers,
            stream: Box::pin(stream),
        })
    }
}
