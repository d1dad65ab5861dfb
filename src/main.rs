//! Entry point wiring CLI dispatch to the interaction pipeline.

use std::process::ExitCode;

use anyhow::Result;
use ddi_assistant::{cli::Cli, config::Settings, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    logging::init_tracing()?;
    let cli = Cli::parse();
    let settings = Settings::load()?;

    info!(command = cli.command_name(), "starting command");
    cli.dispatch(settings).await
}
