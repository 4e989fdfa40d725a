mod commands;
mod config;
mod directory;
mod error;
mod mention;
mod report;
mod scan;
mod slack;
mod tally;
mod telemetry;
mod window;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::doctor::DoctorArgs;
use commands::init::InitArgs;
use commands::run::RunArgs;

#[derive(Debug, Parser)]
#[command(
    name = "likecount",
    version,
    about = "Daily like-mention tally for Slack workspaces"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan the previous business day's messages and post the tally
    Run(RunArgs),
    /// Validate config, token, and Slack access
    Doctor(DoctorArgs),
    /// Generate .likecount.toml
    Init(InitArgs),
    /// Print the JSON Schema for .likecount.toml
    Schema,
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Run(_) => "run",
            Self::Doctor(_) => "doctor",
            Self::Init(_) => "init",
            Self::Schema => "schema",
        }
    }
}

fn main() -> ExitCode {
    let _telemetry = telemetry::init();

    let cli = Cli::parse();

    let _span = tracing::info_span!("command", name = cli.command.name()).entered();

    let result = match cli.command {
        Commands::Run(args) => args.execute(),
        Commands::Doctor(args) => args.execute(),
        Commands::Init(args) => args.execute(),
        Commands::Schema => commands::schema::run_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(exit_err) = e.downcast_ref::<error::ExitError>() {
                eprintln!("error: {exit_err}");
                exit_err.exit_code()
            } else {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        }
    }
}
