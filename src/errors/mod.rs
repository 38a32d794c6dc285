mod categories;
mod error;
mod mapping;

pub use categories::{ConfigurationError, NetworkError};
pub use error::{OpenAIError, OpenAIResult};
pub use mapping::{ErrorMapper, OpenAIErrorDetail, OpenAIErrorResponse};
