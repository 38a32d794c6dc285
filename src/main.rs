use clap::error::ErrorKind;
use clap::Parser;
use openai_cli::cli::{self, Cli};
use openai_cli::errors::OpenAIError;
use std::io::IsTerminal;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Err(err) = cli.logging_config().init() {
        eprintln!("warning: could not initialise logging: {err}");
    }

    match openai_cli::app::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            report(&cli, &err);
            ExitCode::FAILURE
        }
    }
}

fn report(cli: &Cli, err: &OpenAIError) {
    let message = match err {
        OpenAIError::Configuration(config) if config.is_missing_options() => config.to_string(),
        other => other.to_string(),
    };

    if use_color() {
        eprintln!("\x1b[31m{message}\x1b[0m");
    } else {
        eprintln!("{message}");
    }

    if let Some(body) = err.surfaced_body() {
        eprintln!("{body}");
    }

    if let OpenAIError::Configuration(config) = err {
        if config.is_missing_options() {
            println!();
            println!("{}", cli::subcommand_help(cli.command.name()));
        }
    }
}

fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var("TERM").map_or(true, |term| term != "dumb")
}
