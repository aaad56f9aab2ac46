//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vigil_lsp::ServerSettings;

/// Vigil - security rules in your editor and CI
#[derive(Parser)]
#[command(name = "vigil")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analysis engine endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub engine_url: Option<String>,

    /// Rule metadata service base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Token sent to the remote services
    #[arg(long, global = true, value_name = "TOKEN")]
    pub api_token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the LSP server on stdio
    Lsp,

    /// Analyse files once and print the findings
    Check {
        /// Files to analyse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Workspace root holding vigil.yml (defaults to the current directory)
        #[arg(short, long, value_name = "DIR")]
        workspace: Option<PathBuf>,
    },

    /// Create a starter vigil.yml in the current directory
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Server settings with the global flags applied.
    pub fn settings(&self) -> ServerSettings {
        let mut settings = ServerSettings::default();
        if let Some(url) = &self.engine_url {
            settings.engine_url = url.clone();
        }
        if let Some(url) = &self.api_url {
            settings.api_url = url.clone();
        }
        if let Some(token) = &self.api_token {
            settings.api_token = Some(token.clone());
        }
        settings
    }
}
