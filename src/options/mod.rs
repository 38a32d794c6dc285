//! Request options.
//!
//! An [`OptionSet`] is the mergeable draft every source contributes to:
//! built-in defaults, then the environment, then an options file, then
//! explicit flags. Once merged it is turned into one of the immutable
//! records ([`ChatOptions`], [`TranscriptionOptions`]) the services consume.

mod file;

use crate::errors::{ConfigurationError, OpenAIResult};
use crate::services::audio::AudioResponseFormat;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_N: u32 = 1;
pub const DEFAULT_CHAT_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_TRANSCRIPTION_TEMPERATURE: f32 = 0.0;

/// Values the environment contributes, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvDefaults {
    pub api_key: Option<SecretString>,
    pub model: Option<String>,
}

impl EnvDefaults {
    /// Reads `OPENAI_API_KEY` and `OPENAI_MODEL`. Empty values count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            api_key: lookup("OPENAI_API_KEY")
                .filter(|v| !v.is_empty())
                .map(SecretString::new),
            model: lookup("OPENAI_MODEL").filter(|v| !v.is_empty()),
        }
    }
}

/// Partially specified request parameters.
///
/// This is also the options-file format. The API key and the `json` and
/// `stream` toggles are accepted when reading but never written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSet {
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// Files written by older versions hold a single string here.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "one_or_many"
    )]
    pub stop: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<AudioResponseFormat>,

    #[serde(skip_serializing)]
    pub stream: Option<bool>,

    #[serde(skip_serializing)]
    pub json: Option<bool>,
}

impl OptionSet {
    pub fn chat_defaults(env: &EnvDefaults) -> Self {
        Self {
            api_key: env.api_key.clone(),
            model: Some(
                env.model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            ),
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            n: Some(DEFAULT_N),
            temperature: Some(DEFAULT_CHAT_TEMPERATURE),
            stream: Some(false),
            ..Self::default()
        }
    }

    /// `OPENAI_MODEL` names a chat model, so it is not consulted here.
    pub fn transcription_defaults(env: &EnvDefaults) -> Self {
        Self {
            api_key: env.api_key.clone(),
            model: Some(DEFAULT_TRANSCRIPTION_MODEL.to_string()),
            output: Some(AudioResponseFormat::default()),
            temperature: Some(DEFAULT_TRANSCRIPTION_TEMPERATURE),
            ..Self::default()
        }
    }

    /// Overlays every field `overrides` sets onto `self`.
    pub fn merge(&mut self, overrides: OptionSet) {
        fn overlay<T>(base: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *base = value;
            }
        }

        overlay(&mut self.api_key, overrides.api_key);
        overlay(&mut self.model, overrides.model);
        overlay(&mut self.system_prompt, overrides.system_prompt);
        overlay(&mut self.user_prompt, overrides.user_prompt);
        overlay(&mut self.max_tokens, overrides.max_tokens);
        overlay(&mut self.n, overrides.n);
        overlay(&mut self.stop, overrides.stop);
        overlay(&mut self.temperature, overrides.temperature);
        overlay(&mut self.file, overrides.file);
        overlay(&mut self.prompt, overrides.prompt);
        overlay(&mut self.language, overrides.language);
        overlay(&mut self.output, overrides.output);
        overlay(&mut self.stream, overrides.stream);
        overlay(&mut self.json, overrides.json);
    }

    /// Layers defaults, an optional options file and explicit values.
    pub fn layered(
        defaults: OptionSet,
        options_file: Option<&Path>,
        explicit: OptionSet,
    ) -> OpenAIResult<Self> {
        let mut draft = defaults;
        if let Some(path) = options_file {
            draft.merge(OptionSet::read_from(path)?);
        }
        draft.merge(explicit);
        Ok(draft)
    }

    /// Finalises a chat request. Fails listing every missing required
    /// option in the order api_key, system_prompt, user_prompt.
    pub fn into_chat_options(self) -> OpenAIResult<ChatOptions> {
        let mut missing = Vec::new();
        if !has_api_key(&self.api_key) {
            missing.push("api_key");
        }
        if self.system_prompt.is_none() {
            missing.push("system_prompt");
        }
        if self.user_prompt.is_none() {
            missing.push("user_prompt");
        }
        if !missing.is_empty() {
            return Err(missing_options(&missing));
        }

        Ok(ChatOptions {
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            system_prompt: self.system_prompt.unwrap_or_default(),
            user_prompt: self.user_prompt.unwrap_or_default(),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            n: self.n.unwrap_or(DEFAULT_N),
            stop: self.stop,
            temperature: self.temperature.unwrap_or(DEFAULT_CHAT_TEMPERATURE),
            stream: self.stream.unwrap_or(false),
            json: self.json.unwrap_or(false),
            api_key: self.api_key,
        })
    }

    pub fn into_transcription_options(self) -> OpenAIResult<TranscriptionOptions> {
        let mut missing = Vec::new();
        if !has_api_key(&self.api_key) {
            missing.push("api_key");
        }
        if self.file.is_none() {
            missing.push("file");
        }
        if !missing.is_empty() {
            return Err(missing_options(&missing));
        }

        Ok(TranscriptionOptions {
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_MODEL.to_string()),
            file: self.file.unwrap_or_default(),
            prompt: self.prompt,
            response_format: self.output.unwrap_or_default(),
            temperature: self
                .temperature
                .unwrap_or(DEFAULT_TRANSCRIPTION_TEMPERATURE),
            language: self.language,
            json: self.json.unwrap_or(false),
            api_key: self.api_key,
        })
    }
}

/// A key that is absent or only whitespace cannot authenticate anything.
fn has_api_key(api_key: &Option<SecretString>) -> bool {
    api_key
        .as_ref()
        .is_some_and(|key| !key.expose_secret().trim().is_empty())
}

fn missing_options(names: &[&str]) -> crate::errors::OpenAIError {
    ConfigurationError::MissingRequiredOptions(names.iter().map(|n| n.to_string()).collect())
        .into()
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(stop) => vec![stop],
            OneOrMany::Many(stops) => stops,
        }),
    )
}

/// Everything needed to issue one chat completion request.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub n: u32,
    pub stop: Option<Vec<String>>,
    pub temperature: f32,
    pub stream: bool,
    /// Render the raw JSON instead of extracted text.
    pub json: bool,
    /// Falls back to `OPENAI_API_KEY` at request-build time when unset.
    pub api_key: Option<SecretString>,
}

impl ChatOptions {
    pub fn new(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            n: DEFAULT_N,
            stop: None,
            temperature: DEFAULT_CHAT_TEMPERATURE,
            stream: false,
            json: false,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Everything needed to issue one transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionOptions {
    pub model: String,
    pub file: PathBuf,
    pub prompt: Option<String>,
    pub response_format: AudioResponseFormat,
    pub temperature: f32,
    pub language: Option<String>,
    pub json: bool,
    pub api_key: Option<SecretString>,
}

impl TranscriptionOptions {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            file: file.into(),
            prompt: None,
            response_format: AudioResponseFormat::default(),
            temperature: DEFAULT_TRANSCRIPTION_TEMPERATURE,
            language: None,
            json: false,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into()));
        self
    }

    pub fn with_response_format(mut self, format: AudioResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

/// Outcome of option resolution.
#[derive(Debug)]
pub enum Resolved<T> {
    /// Options are complete; issue the request.
    Run(T),
    /// The merged set was written to this file; nothing else to do.
    Saved(PathBuf),
}
