//! CLI command definitions and dispatch.

pub mod config;
pub mod down;
pub mod restart;
pub mod up;

use clap::{Parser, Subcommand};

/// mocknet — create mock network services with ease.
#[derive(Parser, Debug)]
#[command(name = "mocknet", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the configuration graph and start the mock services.
    Up(up::UpArgs),
    /// Stop running mock services.
    Down(down::DownArgs),
    /// Restart running mock services.
    Restart(restart::RestartArgs),
    /// Validate and view the resolved configuration.
    Config(config::ConfigArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Up(args) => up::execute(args),
        Command::Down(args) => down::execute(args),
        Command::Restart(args) => restart::execute(args),
        Command::Config(args) => config::execute(args),
    }
}
