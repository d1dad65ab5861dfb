//! CLI entry-point for serving the HTTP API.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{api, config::Settings, pipeline::InteractionService};

/// Run the Axum server.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Port to bind (default 5000).
    #[arg(long, default_value_t = 5000)]
    pub port: u16,
    /// Host address, defaults to localhost.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<ExitCode> {
    // Resources load before binding so a broken artifact never serves traffic.
    let service = tokio::task::spawn_blocking(move || InteractionService::load(&settings))
        .await?
        .context("loading interaction resources")?;
    api::serve(service, args.host, args.port).await?;
    Ok(ExitCode::SUCCESS)
}
