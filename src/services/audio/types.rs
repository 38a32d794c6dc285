use serde::{Deserialize, Serialize};
use std::fmt;

/// The `response_format` of a transcription request.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AudioResponseFormat {
    #[default]
    Json,
    Text,
    Srt,
    #[serde(rename = "verbose_json")]
    #[value(name = "verbose_json")]
    VerboseJson,
    Vtt,
}

impl AudioResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioResponseFormat::Json => "json",
            AudioResponseFormat::Text => "text",
            AudioResponseFormat::Srt => "srt",
            AudioResponseFormat::VerboseJson => "verbose_json",
            AudioResponseFormat::Vtt => "vtt",
        }
    }

    /// Whether the API answers this format with a JSON document.
    pub fn is_json(&self) -> bool {
        matches!(
            self,
            AudioResponseFormat::Json | AudioResponseFormat::VerboseJson
        )
    }
}

impl fmt::Display for AudioResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transcription as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutput {
    /// `json` and `verbose_json` responses.
    Json(serde_json::Value),
    /// `text`, `srt` and `vtt` responses, verbatim.
    Text(String),
}

impl TranscriptionOutput {
    /// The transcript itself: the `text` field of a JSON response, or the
    /// raw body otherwise.
    pub fn transcript(&self) -> Option<&str> {
        match self {
            TranscriptionOutput::Json(value) => value.get("text").and_then(|t| t.as_str()),
            TranscriptionOutput::Text(text) => Some(text),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TranscriptionOutput::Json(value) => value.clone(),
            TranscriptionOutput::Text(text) => serde_json::Value::String(text.clone()),
        }
    }
}
