// ABOUTME: Entry point for the stagehand CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use stagehand::config::{self, Config};
use stagehand::error::{Error, Result};
use stagehand::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

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

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        let output = Output::new(mode);
        match &e {
            Error::RollbackFailed(_) => output.fatal(&e.to_string()),
            _ => output.error(&e.to_string()),
        }
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let cwd = env::current_dir()?;
    let output = Output::new(mode);
    let token = cli.token.as_deref();

    match cli.command {
        Commands::Init { force } => {
            config::init_config(&cwd, force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Deploy {
            target,
            dir,
            activate,
        } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::deploy(&config, token, &target, &dir, activate, output).await
        }
        Commands::Activate { target, version } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::activate(&config, token, &target, &version, output).await
        }
        Commands::Flush { target, version } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::flush(&config, token, &target, &version, output).await
        }
        Commands::Deployments { target } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::deployments(&config, token, &target, output).await
        }
        Commands::Targets => {
            let config = Config::discover_or_default(&cwd)?;
            commands::targets(&config, token, output).await
        }
        Commands::Whoami => {
            let config = Config::discover_or_default(&cwd)?;
            commands::whoami(&config, token, output).await
        }
        Commands::Token => {
            let config = Config::discover_or_default(&cwd)?;
            commands::token(&config, token, output).await
        }
        Commands::Invalidate { target, paths } => {
            let config = Config::discover_or_default(&cwd)?;
            commands::invalidate(&config, token, &target, &paths, output).await
        }
    }
}
