//! CLI entry-point for fitting the interaction model.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    data::interactions,
    nlp::relclf::{self, TrainOptions},
};

/// Args for the `train` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Artifact destination; defaults to MODEL_PATH.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Share of rows held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,
    /// Shuffle seed for the hold-out split.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Optimiser iteration cap.
    #[arg(long, default_value_t = 1000)]
    pub max_iterations: u64,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<ExitCode> {
    let rows = interactions::load_rows(&settings.interactions_csv)
        .context("reading interaction dataset")?;
    let options = TrainOptions {
        test_fraction: args.test_fraction,
        seed: args.seed,
        max_iterations: args.max_iterations,
    };
    let (classifier, report) =
        tokio::task::spawn_blocking(move || relclf::train(&rows, &options)).await??;

    for class in &report.per_class {
        info!(
            severity = %class.severity,
            precision = class.precision,
            recall = class.recall,
            support = class.support,
            "hold-out metrics"
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);

    let output = args.output.unwrap_or(settings.model_path);
    classifier.save(&output)?;
    Ok(ExitCode::SUCCESS)
}
