// canonid CLI - manifest build operations

mod exit_codes;
mod fetch;
mod ingest;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_INGEST_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "canonid")]
#[command(about = "Canonical instrument identity manifests from registry reference data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull raw reference data from the provider API
    #[command(subcommand)]
    Fetch(fetch::FetchCommands),

    /// Build manifests from raw reference files
    #[command(subcommand)]
    Ingest(ingest::IngestCommands),
}

/// CLI-level error: exit code + message + optional hint for the user.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INGEST_IO, message: msg.into(), hint: None }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch(command) => fetch::cmd_fetch(command),
        Commands::Ingest(command) => ingest::cmd_ingest(command),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
