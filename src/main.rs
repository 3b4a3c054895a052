// ABOUTME: Entry point for the logtail CLI application.
// ABOUTME: Parses arguments, loads the env file, and dispatches to the log command.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use logtail::config::{Settings, load_env_file};
use logtail::error::{EXIT_INTERRUPTED, Result};
use logtail::output::{Output, OutputMode};
use logtail::stream::TailOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, Output::new(mode)).await {
        let code = e.exit_code();
        if code != EXIT_INTERRUPTED {
            Output::new(mode).error(&e.to_string());
        }
        std::process::exit(code);
    }
}

async fn run(cli: Cli, output: Output) -> Result<()> {
    load_env_file(&cli.env_file)?;
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Log { log_file, lines } => {
            let options = TailOptions { lines };
            commands::log_command(settings, &log_file, options, output).await
        }
    }
}
