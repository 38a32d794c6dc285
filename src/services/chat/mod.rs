mod service;
mod types;

pub use service::{
    build_chat_request, ChatCompletionService, ChatCompletionServiceImpl, ChatCompletionStream,
    CHAT_COMPLETIONS_PATH,
};
pub use types::{ChatCompletionRequest, ChatMessage, ChatMessageRole};
