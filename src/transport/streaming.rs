//! Incremental Server-Sent-Events decoding.
//!
//! Network chunks never line up with SSE lines, so bytes are accumulated in a
//! [`LineBuffer`] and only complete lines are interpreted. Only `data: `
//! fields are consumed; every other SSE field, comment and blank separator is
//! skipped. A `data: [DONE]` line ends the stream on the spot, even when more
//! bytes are already buffered behind it.

use crate::errors::{OpenAIError, OpenAIResult};
use bytes::Bytes;
use futures::{ready, Stream, StreamExt};
use pin_project_lite::pin_project;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Literal prefix of the only SSE field this client consumes.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks the end of a completion stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Growable byte buffer that hands out complete lines.
///
/// Lines are returned as raw bytes; decoding is left to the caller so a
/// multi-byte UTF-8 character split across two chunks is decoded intact and
/// invalid UTF-8 can be rejected instead of replaced.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Removes the next `\n`-terminated line from the front of the buffer and
    /// returns it without its `\n` or `\r\n` terminator. Returns `None` while
    /// only a partial line is buffered.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drops whatever is buffered and returns how many bytes were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.buffer.len();
        self.buffer.clear();
        discarded
    }
}

/// What a single SSE line means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Keep-alive or event separator.
    Blank,
    /// `event:`, `id:`, `retry:`, comments and anything else not `data: `.
    Ignored,
    /// The `[DONE]` sentinel.
    Done,
    /// Trimmed payload of a `data: ` line.
    Data(&'a str),
}

impl<'a> SseLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.trim().is_empty() {
            return SseLine::Blank;
        }

        match line.strip_prefix(DATA_PREFIX) {
            None => SseLine::Ignored,
            Some(rest) => {
                let payload = rest.trim();
                if payload == DONE_SENTINEL {
                    SseLine::Done
                } else {
                    SseLine::Data(payload)
                }
            }
        }
    }
}

/// One decoded `data:` payload: a JSON object in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SseEvent(Map<String, Value>);

impl SseEvent {
    /// Parses a `data:` payload. Anything but a JSON object is malformed.
    pub fn parse(payload: &str) -> OpenAIResult<Self> {
        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(fields)) => Ok(Self(fields)),
            Ok(other) => Err(OpenAIError::MalformedEvent {
                payload: payload.to_string(),
                reason: format!("expected a JSON object, got {}", json_kind(&other)),
            }),
            Err(e) => Err(OpenAIError::MalformedEvent {
                payload: payload.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The text increment of a chat completion chunk, found at
    /// `choices[0].delta.content`. `None` if any level is missing or the
    /// content is not a string.
    pub fn delta_content(&self) -> Option<&str> {
        self.0
            .get("choices")?
            .get(0)?
            .get("delta")?
            .get("content")?
            .as_str()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl fmt::Display for SseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl From<SseEvent> for Value {
    fn from(event: SseEvent) -> Self {
        event.into_value()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Push-based SSE decoder.
///
/// Feed it chunks with [`push`](Self::push) and pull events with
/// [`next_event`](Self::next_event). Once finished (sentinel, malformed
/// payload, or [`close`](Self::close)) it ignores further input.
#[derive(Debug, Default)]
pub struct SseDecoder {
    lines: LineBuffer,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        if !self.finished {
            self.lines.extend(chunk);
        }
    }

    /// Returns the next event that can be decoded from the buffered lines,
    /// or `None` if more bytes are needed or decoding has finished.
    pub fn next_event(&mut self) -> Option<OpenAIResult<SseEvent>> {
        while !self.finished {
            let line = match String::from_utf8(self.lines.next_line()?) {
                Ok(line) => line,
                Err(e) if e.as_bytes().starts_with(DATA_PREFIX.as_bytes()) => {
                    let payload = String::from_utf8_lossy(&e.as_bytes()[DATA_PREFIX.len()..])
                        .trim()
                        .to_string();
                    self.finish();
                    return Some(Err(OpenAIError::MalformedEvent {
                        payload,
                        reason: e.utf8_error().to_string(),
                    }));
                }
                Err(_) => {
                    tracing::trace!("Skipping non-UTF-8 SSE line");
                    continue;
                }
            };
            match SseLine::classify(&line) {
                SseLine::Blank => continue,
                SseLine::Ignored => {
                    tracing::trace!(line = %line, "Skipping non-data SSE line");
                }
                SseLine::Done => {
                    tracing::debug!("Received end-of-stream sentinel");
                    self.finish();
                }
                SseLine::Data(payload) => {
                    let event = SseEvent::parse(payload);
                    if event.is_err() {
                        self.finish();
                    }
                    return Some(event);
                }
            }
        }
        None
    }

    /// Convenience for callers that already hold a whole chunk: push it and
    /// collect every event it completes. Stops at the first malformed event.
    pub fn decode(&mut self, chunk: &[u8]) -> OpenAIResult<Vec<SseEvent>> {
        self.push(chunk);
        let mut events = Vec::new();
        while let Some(event) = self.next_event() {
            events.push(event?);
        }
        Ok(events)
    }

    /// Stops decoding and discards anything still buffered.
    pub fn finish(&mut self) {
        let discarded = self.lines.clear();
        if discarded > 0 {
            tracing::debug!(bytes = discarded, "Discarding buffered bytes after end of stream");
        }
        self.finished = true;
    }

    /// Called when the transport closes. A trailing partial line is dropped.
    pub fn close(&mut self) {
        if !self.finished && !self.lines.is_empty() {
            tracing::debug!(
                bytes = self.lines.len(),
                "Stream closed with an unterminated line"
            );
        }
        self.finish();
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

pin_project! {
    /// Adapts a body byte stream into a stream of [`SseEvent`]s.
    ///
    /// The inner stream is not polled again once decoding has finished, so
    /// dropping this adapter after the sentinel releases the connection
    /// without reading the rest of the body.
    pub struct SseStream<S> {
        #[pin]
        inner: S,
        decoder: SseDecoder,
    }
}

impl<S> fmt::Debug for SseStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseStream")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl<S> SseStream<S>
where
    S: Stream<Item = OpenAIResult<Bytes>>,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            decoder: SseDecoder::new(),
        }
    }

    /// Drains the stream into a [`StreamResult`], failing on the first error.
    pub async fn collect_events(self) -> OpenAIResult<StreamResult> {
        let mut stream = Box::pin(self);
        let mut result = StreamResult::new();
        while let Some(event) = stream.next().await {
            result.push(event?);
        }
        Ok(result)
    }
}

impl<S> Stream for SseStream<S>
where
    S: Stream<Item = OpenAIResult<Bytes>>,
{
    type Item = OpenAIResult<SseEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(event) = this.decoder.next_event() {
                return Poll::Ready(Some(event));
            }
            if this.decoder.is_finished() {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.decoder.push(&chunk),
                Some(Err(e)) => {
                    this.decoder.finish();
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    this.decoder.close();
                    return Poll::Ready(None);
                }
            }
        }
    }
}

/// Every event of a finished stream, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StreamResult {
    events: Vec<SseEvent>,
}

impl StreamResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: SseEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[SseEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Concatenation of every delta, i.e. the full generated text.
    pub fn content(&self) -> String {
        self.events
            .iter()
            .filter_map(SseEvent::delta_content)
            .collect()
    }

    pub fn into_events(self) -> Vec<SseEvent> {
        self.events
    }
}

impl IntoIterator for StreamResult {
    type Item = SseEvent;
    type IntoIter = std::vec::IntoIter<SseEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

/// True when a `Content-Type` value names `text/event-stream`, parameters
/// such as `charset` notwithstanding.
pub fn is_event_stream(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .map(|m| m.essence_str() == mime::TEXT_EVENT_STREAM.essence_str())
        .unwrap_or(false)
}
