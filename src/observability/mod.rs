//! Structured logging via `tracing`.

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
