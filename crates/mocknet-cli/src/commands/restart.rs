//! `mocknet restart` — Restart running mock services.

use clap::Args;

/// Arguments for the `restart` subcommand.
#[derive(Args, Debug)]
pub struct RestartArgs {
    /// Service names to restart. If empty, restarts all.
    pub services: Vec<String>,
}

/// Executes the `restart` command.
///
/// # Errors
///
/// Returns an error if restarting services fails.
pub fn execute(_args: RestartArgs) -> anyhow::Result<()> {
    tracing::info!("restarting mock services");
    Ok(())
}
