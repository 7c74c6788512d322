//! `mocknet config` — Validate and view the resolved configuration.

use std::path::Path;

use clap::Args;

use crate::output;

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to the root configuration file.
    #[arg(default_value = mocknet_common::constants::DEFAULT_CONFIG_FILE)]
    pub file: String,

    /// Emit the resolved services as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `config` command.
///
/// Parses the configuration graph and prints the fully resolved service
/// list, so the expansion of stacks and templates can be inspected
/// without starting anything.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or resolved.
pub fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    let registry = mocknet_config::parse_file(Path::new(&args.file))?;
    let services = registry.resolve()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&services)?);
        return Ok(());
    }

    println!("Configuration: {}", args.file);
    println!(
        "  {} file(s), {} stack(s), {} named service(s)",
        registry.documents().len(),
        registry.stacks().len(),
        registry.services().len()
    );
    println!();

    for service in &services {
        println!("  {}", service.name);
        println!("      endpoint: {}", output::format_endpoint(service));
        if let Some(handler) = &service.handler {
            println!("      handler:  {}", handler.name());
        }
        if !service.protocol_attrs.is_empty() {
            let keys: Vec<&str> = service
                .protocol_attrs
                .keys()
                .map(String::as_str)
                .collect();
            println!("      attrs:    {}", keys.join(", "));
        }
        if !service.inherits.is_empty() {
            println!("      via:      {}", output::format_provenance(&service.inherits));
        }
    }

    println!();
    println!("  {} service(s) resolved.", services.len());

    Ok(())
}
