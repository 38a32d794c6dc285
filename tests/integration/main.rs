//! Integration tests using WireMock
//!
//! These run the real reqwest transport against a local mock server and
//! check what ends up on the output sink.

mod chat_completions;
mod transcriptions;

use openai_cli::config::OpenAIConfig;
use openai_cli::transport::ReqwestTransport;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "sk-integration";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Transport pointed at `<mock server>/v1`.
pub fn transport_for(server: &MockServer) -> Arc<ReqwestTransport> {
    let base_url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
    let config = OpenAIConfig::new().with_base_url(base_url);
    Arc::new(ReqwestTransport::new(&config).unwrap())
}

/// A POST mock that also requires the bearer token.
pub fn mock_with_auth(endpoint: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(format!("/v1/{}", endpoint)))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
}

pub fn event_stream(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}
