use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Missing required options: {}", .0.join(", "))]
    MissingRequiredOptions(Vec<String>),

    #[error("Conflicting options: both --{0} and --{1} were provided")]
    ConflictingOptions(String, String),

    #[error("Invalid option {option}: {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Invalid options file {path}: {reason}")]
    InvalidOptionsFile { path: String, reason: String },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

impl ConfigurationError {
    /// True when the user left out options the command cannot run without.
    pub fn is_missing_options(&self) -> bool {
        matches!(
            self,
            ConfigurationError::MissingRequiredOptions(_) | ConfigurationError::MissingApiKey(_)
        )
    }
}

#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Response body interrupted: {0}")]
    BodyInterrupted(String),
}
