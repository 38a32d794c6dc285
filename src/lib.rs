//! Command-line client for OpenAI chat completions and audio transcription.
//!
//! Chat completions can be streamed: the response body is decoded
//! incrementally as Server-Sent Events and each text delta is written as soon
//! as it arrives.
//!
//! # Layout
//!
//! - [`options`]: resolves request parameters from defaults, environment, an
//!   options file and flags
//! - [`services`]: builds requests and checks responses for each endpoint
//! - [`transport`]: HTTP transport and the incremental SSE decoder
//! - [`dispatch`]: renders responses to an output sink
//! - [`cli`] / [`app`]: argument parsing and wiring for the `openai` binary
//!
//! ```no_run
//! use openai_cli::config::OpenAIConfig;
//! use openai_cli::dispatch::{OutputMode, ResponseDispatcher};
//! use openai_cli::options::ChatOptions;
//! use openai_cli::services::chat::ChatCompletionServiceImpl;
//! use openai_cli::transport::ReqwestTransport;
//! use std::sync::Arc;
//!
//! # async fn example() -> openai_cli::errors::OpenAIResult<()> {
//! let transport = Arc::new(ReqwestTransport::new(&OpenAIConfig::from_env()?)?);
//! let service = ChatCompletionServiceImpl::new(transport);
//! let options = ChatOptions::new("gpt-3.5-turbo", "Be brief.", "Say hi").with_stream(true);
//!
//! let mut dispatcher = ResponseDispatcher::new(std::io::stdout(), OutputMode::Text);
//! dispatcher.dispatch_chat(&service, &options).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod observability;
pub mod options;
pub mod services;
pub mod transport;

#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod mocks;

pub use errors::{OpenAIError, OpenAIResult};
