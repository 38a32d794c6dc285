//! Canned requests and responses shared by unit tests.

use crate::options::{ChatOptions, TranscriptionOptions};
use serde_json::json;
use std::path::PathBuf;

pub fn chat_options() -> ChatOptions {
    ChatOptions::new("gpt-3.5-turbo", "You are a helpful assistant.", "Say hi").with_api_key("sk-test")
}

pub fn transcription_options(file: impl Into<PathBuf>) -> TranscriptionOptions {
    TranscriptionOptions::new(file).with_api_key("sk-test")
}

/// Sample chat completion response
pub fn chat_completion_response() -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Hello there!"
            },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 9,
            "completion_tokens": 3,
            "total_tokens": 12
        }
    })
}

/// A complete streamed completion, role chunk through `[DONE]`.
pub fn event_stream_body() -> &'static str {
    concat!(
        "data: {\"id\":\"chatcmpl-123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" world\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-123\",\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    )
}

pub fn transcription_response() -> serde_json::Value {
    json!({
        "text": "Hello from the recording."
    })
}
