//! Command-line interface wiring for ddi-assistant.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Settings;

pub mod analyze;
pub mod serve;
pub mod train;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Drug interaction severity assistant", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Sub-command name for logs; arguments may carry user text and are omitted.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Analyze(_) => "analyze",
            Commands::Serve(_) => "serve",
            Commands::Train(_) => "train",
        }
    }

    /// Dispatch the selected sub-command and report the process exit status.
    pub async fn dispatch(self, settings: Settings) -> Result<ExitCode> {
        match self.command {
            Commands::Analyze(args) => analyze::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
            Commands::Train(args) => train::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyse free text for interacting medicines.
    Analyze(analyze::Args),
    /// Serve the JSON prediction API.
    Serve(serve::Args),
    /// Fit the interaction model from the labelled dataset.
    Train(train::Args),
}

/// Report rendering for the `analyze` command.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable blocks.
    #[default]
    Text,
    /// The JSON response body the API returns.
    Json,
}
