//! Connection-level configuration shared by every request of an invocation.
//!
//! Request parameters (model, prompts, API key, ...) live in
//! [`crate::options`]; this module only covers where and how we connect.

use crate::errors::{ConfigurationError, OpenAIError, OpenAIResult};
use std::time::Duration;
use url::Url;

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default TCP/TLS connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// `None` targets [`DEFAULT_BASE_URL`].
    pub base_url: Option<Url>,

    /// Overall request timeout. `None` means a stream may run as long as
    /// the server keeps it open.
    pub timeout: Option<Duration>,

    pub connect_timeout: Duration,

    pub user_agent: String,
}

impl OpenAIConfig {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }

    /// Creates a new OpenAIConfig from environment variables
    ///
    /// Reads the following environment variables:
    /// - OPENAI_BASE_URL (optional, defaults to https://api.openai.com/v1)
    /// - OPENAI_TIMEOUT (optional, whole-request timeout in seconds)
    pub fn from_env() -> OpenAIResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> OpenAIResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(base_url) = lookup("OPENAI_BASE_URL").filter(|v| !v.is_empty()) {
            let url = Url::parse(&base_url).map_err(|e| {
                OpenAIError::Configuration(ConfigurationError::InvalidBaseUrl(format!(
                    "Invalid OPENAI_BASE_URL: {}",
                    e
                )))
            })?;
            config.base_url = Some(url);
        }

        if let Some(timeout) = lookup("OPENAI_TIMEOUT").filter(|v| !v.is_empty()) {
            let secs = timeout.parse::<u64>().map_err(|_| {
                OpenAIError::Configuration(ConfigurationError::InvalidTimeout(format!(
                    "OPENAI_TIMEOUT must be a whole number of seconds, got '{}'",
                    timeout
                )))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> OpenAIResult<()> {
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(OpenAIError::Configuration(
                    ConfigurationError::InvalidTimeout("Timeout must be greater than 0".to_string()),
                ));
            }
        }

        if let Some(base_url) = &self.base_url {
            if !matches!(base_url.scheme(), "http" | "https") {
                return Err(OpenAIError::Configuration(ConfigurationError::InvalidBaseUrl(
                    format!("unsupported scheme '{}'", base_url.scheme()),
                )));
            }
        }

        Ok(())
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_ref()
            .map_or(DEFAULT_BASE_URL, |url| url.as_str())
    }

    /// Full URL for an endpoint path relative to the base URL.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_user_agent() -> String {
    format!("openai-cli/{}", env!("CARGO_PKG_VERSION"))
}
