use crate::errors::categories::{ConfigurationError, NetworkError};
use thiserror::Error;

pub type OpenAIResult<T> = Result<T, OpenAIError>;

#[derive(Error, Debug)]
pub enum OpenAIError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The API answered with a non-success status. `body` is the raw
    /// response body so the user sees exactly what the server said.
    #[error("Upstream error: HTTP {status_code} - {message}")]
    Upstream {
        status_code: u16,
        message: String,
        body: String,
    },

    /// A streaming request came back with something other than
    /// `text/event-stream`.
    #[error("Unexpected response content type, expected text/event-stream: {content_type}")]
    UnexpectedContentType {
        content_type: String,
        body: Option<serde_json::Value>,
    },

    /// A `data:` line carried a payload that is not a JSON object.
    #[error("Malformed stream event: {reason}. Payload: {payload}")]
    MalformedEvent { payload: String, reason: String },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Unexpected response shape: missing {path}")]
    ResponseShape { path: String },
}

impl OpenAIError {
    pub fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        OpenAIError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            OpenAIError::Upstream { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Body text worth showing the user alongside the error message, if any.
    pub fn surfaced_body(&self) -> Option<String> {
        match self {
            OpenAIError::Upstream { body, .. } if !body.is_empty() => Some(body.clone()),
            OpenAIError::UnexpectedContentType {
                body: Some(body), ..
            } => Some(body.to_string()),
            _ => None,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, OpenAIError::Configuration(_))
    }
}

impl From<reqwest::Error> for OpenAIError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OpenAIError::Network(NetworkError::Timeout(err.to_string()))
        } else if err.is_connect() {
            OpenAIError::Network(NetworkError::ConnectionFailed(err.to_string()))
        } else if err.is_body() || err.is_decode() {
            OpenAIError::Network(NetworkError::BodyInterrupted(err.to_string()))
        } else {
            OpenAIError::Network(NetworkError::RequestFailed(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for OpenAIError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            OpenAIError::Deserialization(err.to_string())
        } else {
            OpenAIError::Serialization(err.to_string())
        }
    }
}

impl From<url::ParseError> for OpenAIError {
    fn from(err: url::ParseError) -> Self {
        OpenAIError::Configuration(ConfigurationError::InvalidBaseUrl(err.to_string()))
    }
}
