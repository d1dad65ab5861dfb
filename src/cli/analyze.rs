//! CLI entry-point for one-shot analysis.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{instrument, warn};

use crate::{
    cli::OutputFormat, config::Settings, error::PipelineError, nlp::AnalysisMode,
    pipeline::InteractionService,
};

/// Exit status when the input names fewer than two known drugs.
pub const EXIT_INSUFFICIENT: u8 = 2;

/// Args for the `analyze` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Free-form text mentioning the medicines being taken.
    #[arg(long)]
    pub text: String,
    /// Pair selection policy; defaults to ANALYSIS_MODE.
    #[arg(long, value_enum)]
    pub mode: Option<AnalysisMode>,
    /// Output rendering.
    #[arg(long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[instrument(skip(args, settings), fields(mode = ?args.mode))]
pub async fn run(args: Args, settings: Settings) -> Result<ExitCode> {
    let service = InteractionService::load(&settings).context("loading interaction resources")?;
    match service.analyze(&args.text, args.mode) {
        Ok(report) => {
            match args.format {
                OutputFormat::Text => println!("{}", report.render_text()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_client_error() => {
            warn!(%err, "insufficient input");
            eprintln!("Please enter at least two known medicines.");
            if let PipelineError::InsufficientEntities { found } = &err {
                if !found.is_empty() {
                    eprintln!("Recognised: {}", found.join(", "));
                }
            }
            Ok(ExitCode::from(EXIT_INSUFFICIENT))
        }
        Err(err) => Err(err.into()),
    }
}
