//! kust CLI
//!
//! Renders a kustomization hierarchy into a single YAML document stream.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::BuildArgs;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("failed to initialize logging: {e}")))?;
    tracing::debug!("Verbose mode enabled");

    execute_command(cli.command)
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Build {
            paths,
            output,
            transformer_config,
        } => {
            let cwd = std::env::current_dir()?;
            commands::run_build(
                &cwd,
                &BuildArgs {
                    paths,
                    output,
                    transformer_config,
                },
            )
        }
    }
}
