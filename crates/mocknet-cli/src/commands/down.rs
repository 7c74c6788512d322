//! `mocknet down` — Stop running mock services.

use clap::Args;

/// Arguments for the `down` subcommand.
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Service names to stop. If empty, stops all.
    pub services: Vec<String>,
}

/// Executes the `down` command.
///
/// # Errors
///
/// Returns an error if stopping services fails.
pub fn execute(_args: DownArgs) -> anyhow::Result<()> {
    tracing::info!("stopping mock services");
    Ok(())
}
