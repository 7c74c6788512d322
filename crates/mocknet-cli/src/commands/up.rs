//! `mocknet up` — Resolve the configuration graph and start the services.

use std::path::Path;

use clap::Args;

use crate::output;

/// Arguments for the `up` subcommand.
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Path to the root configuration file.
    #[arg(default_value = mocknet_common::constants::DEFAULT_CONFIG_FILE)]
    pub file: String,
}

/// Executes the `up` command.
///
/// Parses the configuration graph, expands stacks and templates, and
/// reports the materialized services. The service runtime that would
/// bind ports and serve responses is not wired in yet; until it is, the
/// command shows what would be started.
///
/// # Errors
///
/// Returns an error if parsing or resolution fails.
pub fn execute(args: UpArgs) -> anyhow::Result<()> {
    let path = Path::new(&args.file);
    if !path.exists() {
        anyhow::bail!(
            "configuration file not found: {}\n\
             Create a {} file or specify a path: mocknet up <file>",
            args.file,
            mocknet_common::constants::DEFAULT_CONFIG_FILE
        );
    }

    let registry = mocknet_config::parse_file(path)?;
    let services = registry.resolve()?;

    println!("Materialized {} service(s) from {}:", services.len(), args.file);
    for service in &services {
        println!("  + {}  {}", service.name, output::format_endpoint(service));
        if !service.inherits.is_empty() {
            println!("      via: {}", output::format_provenance(&service.inherits));
        }
    }
    println!();
    println!("The service runtime is not available in this build; nothing was started.");

    Ok(())
}
