//! CLI argument definitions.
//!
//! Every flag is optional at the clap level so that an explicitly given flag
//! can be told apart from a default; defaults come from the options layer.

use crate::errors::{ConfigurationError, OpenAIError, OpenAIResult};
use crate::observability::{LogFormat, LogLevel, LoggingConfig};
use crate::options::{ChatOptions, EnvDefaults, OptionSet, Resolved, TranscriptionOptions};
use crate::services::audio::AudioResponseFormat;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use secrecy::SecretString;
use std::path::{Path, PathBuf};

/// Talk to the OpenAI API from the command line.
#[derive(Debug, Parser)]
#[command(name = "openai", version, about, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long, value_enum, global = true, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a system and user prompt to a chat model.
    Chat(ChatArgs),

    /// Transcribe an audio file.
    Transcribe(TranscribeArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Chat(_) => "chat",
            Command::Transcribe(_) => "transcribe",
        }
    }
}

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Model name [default: $OPENAI_MODEL or gpt-3.5-turbo]
    #[arg(short, long)]
    pub model: Option<String>,

    /// System prompt
    #[arg(short, long, value_name = "PROMPT")]
    pub system_prompt: Option<String>,

    /// Read the system prompt from FILE
    #[arg(short = 'S', long, value_name = "FILE")]
    pub system_prompt_file: Option<PathBuf>,

    /// User prompt
    #[arg(short, long, value_name = "PROMPT")]
    pub user_prompt: Option<String>,

    /// Read the user prompt from FILE
    #[arg(short = 'U', long, value_name = "FILE")]
    pub user_prompt_file: Option<PathBuf>,

    /// Maximum number of tokens to generate [default: 1000]
    #[arg(short = 't', long, value_name = "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Number of completions to generate [default: 1]
    #[arg(short = 'n', long = "n", value_name = "N")]
    pub n: Option<u32>,

    /// Stop sequence; may be repeated
    #[arg(long, value_name = "STOP")]
    pub stop: Vec<String>,

    /// Sampling temperature [default: 0.5]
    #[arg(short = 'p', long)]
    pub temperature: Option<f32>,

    /// Stream the response as it is generated
    #[arg(short = 'l', long, visible_alias = "live")]
    pub stream: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct TranscribeArgs {
    /// Audio file to transcribe
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Model name [default: whisper-1]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Text to guide the model's style or continue a previous segment
    #[arg(short = 'P', long)]
    pub prompt: Option<String>,

    /// Response format [default: json]
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub output: Option<AudioResponseFormat>,

    /// Language of the audio as an ISO-639-1 code
    #[arg(short = 'L', long)]
    pub language: Option<String>,

    /// Sampling temperature [default: 0]
    #[arg(short = 'p', long)]
    pub temperature: Option<f32>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Flags shared by every subcommand.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Read request parameters from a JSON options file
    #[arg(short, long, value_name = "FILE")]
    pub read_options: Option<PathBuf>,

    /// Save the request parameters to a JSON options file and exit
    #[arg(short, long, value_name = "FILE")]
    pub write_options: Option<PathBuf>,

    /// API key [default: $OPENAI_API_KEY]
    #[arg(short = 'k', long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Print the raw JSON response
    #[arg(short, long)]
    pub json: bool,
}

impl CommonArgs {
    fn apply(&self, set: &mut OptionSet) {
        set.api_key = self.api_key.clone().map(SecretString::new);
        set.json = self.json.then_some(true);
    }

    /// Layers defaults, the options file and `explicit`, then either saves the
    /// merged set or finalises it.
    fn resolve<T>(
        &self,
        defaults: OptionSet,
        explicit: OptionSet,
        finish: impl FnOnce(OptionSet) -> OpenAIResult<T>,
    ) -> OpenAIResult<Resolved<T>> {
        let draft = OptionSet::layered(defaults, self.read_options.as_deref(), explicit)?;

        if let Some(path) = &self.write_options {
            draft.write_to(path)?;
            return Ok(Resolved::Saved(path.clone()));
        }

        finish(draft).map(Resolved::Run)
    }
}

impl ChatArgs {
    /// Only the values given on the command line. Prompt files are read here.
    pub fn explicit(&self) -> OpenAIResult<OptionSet> {
        let mut set = OptionSet {
            model: self.model.clone(),
            system_prompt: prompt_source(
                self.system_prompt.as_deref(),
                self.system_prompt_file.as_deref(),
                ("system-prompt", "system-prompt-file"),
            )?,
            user_prompt: prompt_source(
                self.user_prompt.as_deref(),
                self.user_prompt_file.as_deref(),
                ("user-prompt", "user-prompt-file"),
            )?,
            max_tokens: self.max_tokens,
            n: self.n,
            stop: (!self.stop.is_empty()).then(|| self.stop.clone()),
            temperature: self.temperature,
            stream: self.stream.then_some(true),
            ..OptionSet::default()
        };
        self.common.apply(&mut set);
        Ok(set)
    }

    pub fn resolve(&self, env: &EnvDefaults) -> OpenAIResult<Resolved<ChatOptions>> {
        self.common.resolve(
            OptionSet::chat_defaults(env),
            self.explicit()?,
            OptionSet::into_chat_options,
        )
    }
}

impl TranscribeArgs {
    pub fn explicit(&self) -> OptionSet {
        let mut set = OptionSet {
            model: self.model.clone(),
            file: self.file.clone(),
            prompt: self.prompt.clone(),
            output: self.output,
            language: self.language.clone(),
            temperature: self.temperature,
            ..OptionSet::default()
        };
        self.common.apply(&mut set);
        set
    }

    pub fn resolve(&self, env: &EnvDefaults) -> OpenAIResult<Resolved<TranscriptionOptions>> {
        self.common.resolve(
            OptionSet::transcription_defaults(env),
            self.explicit(),
            OptionSet::into_transcription_options,
        )
    }
}

impl Cli {
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new()
            .with_level(LogLevel::from_verbosity(self.verbose))
            .with_format(self.log_format.unwrap_or_default())
    }
}

/// Rendered `--help` of a subcommand.
pub fn subcommand_help(name: &str) -> String {
    let mut command = Cli::command();
    command.build();
    match command.find_subcommand_mut(name) {
        Some(subcommand) => subcommand.render_help().to_string(),
        None => command.render_help().to_string(),
    }
}

fn prompt_source(
    inline: Option<&str>,
    file: Option<&Path>,
    (inline_flag, file_flag): (&str, &str),
) -> OpenAIResult<Option<String>> {
    match (inline, file) {
        (Some(_), Some(_)) => Err(OpenAIError::Configuration(
            ConfigurationError::ConflictingOptions(inline_flag.to_string(), file_flag.to_string()),
        )),
        (Some(prompt), None) => Ok(Some(prompt.to_string())),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map(Some)
            .map_err(|e| OpenAIError::io(path, e)),
        (None, None) => Ok(None),
    }
}
