use crate::errors::{ConfigurationError, OpenAIError, OpenAIResult};
use crate::transport::{HttpRequest, MultipartForm};
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

pub struct RequestBuilder {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Sets `Authorization: Bearer <key>`. The header value is marked
    /// sensitive so it never shows up in `Debug` output.
    pub fn bearer_auth(mut self, api_key: &SecretString) -> OpenAIResult<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|_| {
                OpenAIError::Configuration(ConfigurationError::InvalidOption {
                    option: "api_key".to_string(),
                    reason: "contains characters not allowed in an HTTP header".to_string(),
                })
            })?;
        value.set_sensitive(true);
        self.headers.insert(header::AUTHORIZATION, value);
        Ok(self)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> OpenAIResult<Self> {
        let bytes = serde_json::to_vec(body).map_err(|e| {
            OpenAIError::Serialization(format!("Failed to serialize JSON: {}", e))
        })?;
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Bytes::from(bytes);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> OpenAIResult<Self> {
        let (content_type, body) = form.build();
        let value = HeaderValue::from_str(&content_type)
            .map_err(|e| invalid_header(header::CONTENT_TYPE.as_str(), e.to_string()))?;
        self.headers.insert(header::CONTENT_TYPE, value);
        self.body = body;
        Ok(self)
    }

    pub fn build(self) -> HttpRequest {
        HttpRequest {
            method: self.method,
            path: self.path,
            headers: self.headers,
            body: self.body,
        }
    }
}

fn invalid_header(name: &str, reason: String) -> OpenAIError {
    OpenAIError::Configuration(ConfigurationError::InvalidOption {
        option: format!("header {}", name),
        reason,
    })
}
