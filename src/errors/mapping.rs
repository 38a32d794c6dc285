use crate::errors::OpenAIError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIErrorDetail,
}

/// The API usually sends an object, but proxies and older deployments
/// sometimes send a bare string.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OpenAIErrorDetail {
    Structured {
        message: String,
        #[serde(rename = "type")]
        error_type: Option<String>,
        code: Option<serde_json::Value>,
        param: Option<String>,
    },
    Plain(String),
}

impl OpenAIErrorDetail {
    pub fn message(&self) -> &str {
        match self {
            OpenAIErrorDetail::Structured { message, .. } => message,
            OpenAIErrorDetail::Plain(message) => message,
        }
    }
}

pub struct ErrorMapper;

impl ErrorMapper {
    /// Builds an `Upstream` error from a non-success response.
    pub fn from_response(status_code: u16, body: &[u8]) -> OpenAIError {
        let body = String::from_utf8_lossy(body).into_owned();
        let message = Self::parse_error_response(&body)
            .map(|r| r.error.message().to_string())
            .unwrap_or_else(|| format!("HTTP error: {}", status_code));

        OpenAIError::Upstream {
            status_code,
            message,
            body,
        }
    }

    /// Parses error response from JSON body
    pub fn parse_error_response(body: &str) -> Option<OpenAIErrorResponse> {
        serde_json::from_str(body).ok()
    }
}
