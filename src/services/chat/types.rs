use crate::options::ChatOptions;
use serde::{Deserialize, Serialize};

/// Body of `POST /chat/completions`.
///
/// `stop` is always present, as `null` when no stop sequence was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub n: u32,
    pub stop: Option<Vec<String>>,
    pub temperature: f32,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// A system message followed by a user message, in that order.
    pub fn from_options(options: &ChatOptions) -> Self {
        Self {
            model: options.model.clone(),
            messages: vec![
                ChatMessage::system(&options.system_prompt),
                ChatMessage::user(&options.user_prompt),
            ],
            max_tokens: options.max_tokens,
            n: options.n,
            stop: options.stop.clone(),
            temperature: options.temperature,
            stream: options.stream,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatMessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
}
