//! Diagnostics go to stderr through `tracing`; stdout carries reports only.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Applied when `RUST_LOG` is unset. Request spans from `tower_http` stay
/// visible, dependency chatter does not.
pub const DEFAULT_DIRECTIVES: &str = "info,tower_http=debug,hyper=warn,linfa=warn";

/// Filter from `RUST_LOG`, or [`DEFAULT_DIRECTIVES`] when it is unset or empty.
pub fn env_filter(rust_log: Option<&str>) -> Result<EnvFilter> {
    let directives = rust_log
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES);
    EnvFilter::try_new(directives).with_context(|| format!("invalid log directives {directives:?}"))
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref())?;
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_thread_names(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}
