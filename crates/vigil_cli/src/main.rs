//! Vigil CLI
//!
//! Runs the Vigil language server, or checks files once from a terminal or CI.

mod cli;
mod commands;
mod output;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // stdout carries the LSP protocol in `lsp` mode.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let settings = cli.settings();

    match &cli.command {
        Commands::Lsp => {
            commands::run_lsp(settings)?;
            Ok(false)
        }
        Commands::Check { files, workspace } => {
            commands::run_check(settings, files, workspace.as_deref())
        }
        Commands::Init { force } => {
            let dir = std::env::current_dir().into_diagnostic()?;
            commands::run_init(&dir, *force)?;
            Ok(false)
        }
    }
}
