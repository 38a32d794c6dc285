//! Response dispatch: picks streaming or non-streaming for a request and
//! renders what comes back onto an output sink.
//!
//! Output formats:
//! - streamed text: each delta as it arrives, then a newline
//! - streamed JSON: `[`, one compact event per line joined by `,`, `]`
//! - complete text: `choices[0].message.content` plus a newline
//! - complete JSON: the pretty-printed document

use crate::errors::{OpenAIError, OpenAIResult};
use crate::options::{ChatOptions, TranscriptionOptions};
use crate::services::audio::{AudioService, TranscriptionOutput};
use crate::services::chat::ChatCompletionService;
use crate::transport::{SseEvent, StreamResult};
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::io::Write;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Extracted text only.
    Text,
    /// Raw JSON.
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Text
        }
    }
}

/// What a chat dispatch produced, for callers that want more than the
/// rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Completed(Value),
    Streamed(StreamResult),
}

pub struct ResponseDispatcher<W> {
    sink: W,
    mode: OutputMode,
}

impl<W: Write> ResponseDispatcher<W> {
    pub fn new(sink: W, mode: OutputMode) -> Self {
        Self { sink, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Streams when `options.stream` is set, otherwise waits for the whole
    /// completion; either way the result is rendered before returning.
    pub async fn dispatch_chat(
        &mut self,
        service: &dyn ChatCompletionService,
        options: &ChatOptions,
    ) -> OpenAIResult<ChatOutcome> {
        if options.stream {
            let stream = service.create_stream(options).await?;
            let result = self.render_stream(stream).await?;
            debug!(events = result.len(), "Stream finished");
            Ok(ChatOutcome::Streamed(result))
        } else {
            let response = service.create(options).await?;
            self.render_completion(&response)?;
            Ok(ChatOutcome::Completed(response))
        }
    }

    pub async fn dispatch_transcription(
        &mut self,
        service: &dyn AudioService,
        options: &TranscriptionOptions,
    ) -> OpenAIResult<TranscriptionOutput> {
        let output = service.transcribe(options).await?;
        self.render_transcription(&output)?;
        Ok(output)
    }

    pub fn render_completion(&mut self, response: &Value) -> OpenAIResult<()> {
        match self.mode {
            OutputMode::Json => self.write_pretty(response),
            OutputMode::Text => {
                let content = response
                    .get("choices")
                    .and_then(|c| c.get(0))
                    .and_then(|c| c.get("message"))
                    .and_then(|m| m.get("content"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| OpenAIError::ResponseShape {
                        path: "choices[0].message.content".to_string(),
                    })?;
                self.write(content)?;
                self.write("\n")?;
                self.flush()
            }
        }
    }

    /// Renders events as they arrive, flushing after each one, and returns
    /// everything that was received. The first error stops rendering.
    pub async fn render_stream<S>(&mut self, stream: S) -> OpenAIResult<StreamResult>
    where
        S: Stream<Item = OpenAIResult<SseEvent>>,
    {
        futures::pin_mut!(stream);
        let mut result = StreamResult::new();

        if self.mode == OutputMode::Json {
            self.write("[\n")?;
            self.flush()?;
        }

        while let Some(event) = stream.next().await {
            let event = event?;
            match self.mode {
                OutputMode::Json => {
                    if !result.is_empty() {
                        self.write(",\n")?;
                    }
                    self.write("  ")?;
                    self.write(&event.to_string())?;
                    self.flush()?;
                }
                OutputMode::Text => {
                    if let Some(delta) = event.delta_content() {
                        self.write(delta)?;
                        self.flush()?;
                    }
                }
            }
            result.push(event);
        }

        self.write("\n")?;
        if self.mode == OutputMode::Json {
            self.write("]\n")?;
        }
        self.flush()?;
        Ok(result)
    }

    /// JSON mode pretty-prints the response (a plain-text body becomes a JSON
    /// string). Text mode prints the transcript: the `text` field for JSON
    /// formats, the body as-is for `text`, `srt` and `vtt`.
    pub fn render_transcription(&mut self, output: &TranscriptionOutput) -> OpenAIResult<()> {
        match self.mode {
            OutputMode::Json => self.write_pretty(&output.to_json()),
            OutputMode::Text => {
                let transcript = output.transcript().ok_or_else(|| OpenAIError::ResponseShape {
                    path: "text".to_string(),
                })?;
                self.write(transcript)?;
                if !transcript.ends_with('\n') {
                    self.write("\n")?;
                }
                self.flush()
            }
        }
    }

    fn write_pretty(&mut self, value: &Value) -> OpenAIResult<()> {
        let pretty = serde_json::to_string_pretty(value)
            .map_err(|e| OpenAIError::Serialization(e.to_string()))?;
        self.write(&pretty)?;
        self.write("\n")?;
        self.flush()
    }

    fn write(&mut self, text: &str) -> OpenAIResult<()> {
        self.sink
            .write_all(text.as_bytes())
            .map_err(OpenAIError::Output)
    }

    fn flush(&mut self) -> OpenAIResult<()> {
        self.sink.flush().map_err(OpenAIError::Output)
    }
}
