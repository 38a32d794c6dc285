//! API key resolution.

use crate::errors::{ConfigurationError, OpenAIError, OpenAIResult};
use crate::transport::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

/// Environment variable consulted when no key was given explicitly.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Bearer-token credentials for one request.
pub struct ApiKeyProvider {
    api_key: SecretString,
}

impl ApiKeyProvider {
    pub fn from_secret(api_key: SecretString) -> Self {
        Self { api_key }
    }

    /// Uses the explicit key if there is one, otherwise `OPENAI_API_KEY`.
    pub fn resolve(explicit: Option<&SecretString>) -> OpenAIResult<Self> {
        Self::resolve_with(explicit, |name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_with<F>(explicit: Option<&SecretString>, lookup: F) -> OpenAIResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match explicit {
            Some(key) => key.clone(),
            None => lookup(API_KEY_ENV)
                .filter(|v| !v.is_empty())
                .map(SecretString::new)
                .ok_or_else(|| {
                    OpenAIError::Configuration(ConfigurationError::MissingApiKey(format!(
                        "pass --api-key or set {}",
                        API_KEY_ENV
                    )))
                })?,
        };

        let provider = Self { api_key };
        provider.validate()?;
        Ok(provider)
    }

    pub fn validate(&self) -> OpenAIResult<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(OpenAIError::Configuration(
                ConfigurationError::MissingApiKey("API key is empty".to_string()),
            ));
        }
        Ok(())
    }

    /// Adds the `Authorization` header to a request.
    pub fn apply(&self, builder: RequestBuilder) -> OpenAIResult<RequestBuilder> {
        builder.bearer_auth(&self.api_key)
    }
}

impl std::fmt::Debug for ApiKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyProvider")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
