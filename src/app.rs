//! Wires a parsed command line to the services and writes the result to
//! stdout.

use crate::cli::{ChatArgs, Cli, Command, TranscribeArgs};
use crate::config::OpenAIConfig;
use crate::dispatch::{OutputMode, ResponseDispatcher};
use crate::errors::OpenAIResult;
use crate::options::{EnvDefaults, Resolved};
use crate::services::audio::AudioServiceImpl;
use crate::services::chat::ChatCompletionServiceImpl;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub async fn run(cli: &Cli) -> OpenAIResult<()> {
    let env = EnvDefaults::from_env();
    match &cli.command {
        Command::Chat(args) => run_chat(args, &env).await,
        Command::Transcribe(args) => run_transcribe(args, &env).await,
    }
}

async fn run_chat(args: &ChatArgs, env: &EnvDefaults) -> OpenAIResult<()> {
    let options = match args.resolve(env)? {
        Resolved::Run(options) => options,
        Resolved::Saved(path) => return report_saved(&path),
    };
    info!(model = %options.model, stream = options.stream, "Sending chat completion");

    let service = ChatCompletionServiceImpl::new(transport()?);
    let mut dispatcher =
        ResponseDispatcher::new(std::io::stdout(), OutputMode::from_json_flag(options.json));
    dispatcher.dispatch_chat(&service, &options).await?;
    Ok(())
}

async fn run_transcribe(args: &TranscribeArgs, env: &EnvDefaults) -> OpenAIResult<()> {
    let options = match args.resolve(env)? {
        Resolved::Run(options) => options,
        Resolved::Saved(path) => return report_saved(&path),
    };
    info!(
        model = %options.model,
        file = %options.file.display(),
        format = %options.response_format,
        "Sending transcription"
    );

    let service = AudioServiceImpl::new(transport()?);
    let mut dispatcher =
        ResponseDispatcher::new(std::io::stdout(), OutputMode::from_json_flag(options.json));
    dispatcher.dispatch_transcription(&service, &options).await?;
    Ok(())
}

fn transport() -> OpenAIResult<Arc<dyn HttpTransport>> {
    let config = OpenAIConfig::from_env()?;
    Ok(Arc::new(ReqwestTransport::new(&config)?))
}

fn report_saved(path: &std::path::Path) -> OpenAIResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(stdout, "Options saved to '{}'.", path.display())
        .map_err(crate::errors::OpenAIError::Output)
}
