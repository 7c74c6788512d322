//! # mocknet-config
//!
//! Loader, registry, and resolver for mocknet configuration documents.
//!
//! Handles:
//! - **Document**: immutable model for one configuration file.
//! - **Loader**: YAML decoding with per-field transforms and validation.
//! - **Registry**: breadth-first import-graph traversal, alias/stack/service
//!   registration, and duplicate detection.
//! - **Resolver**: expansion of stack and template references into the
//!   final ordered list of concrete services.
//! - **Handler**: opaque references to user handler modules.

pub mod document;
pub mod handler;
pub mod loader;
pub mod registry;
pub mod resolver;

pub use document::{
    BasicService, Document, ImportItem, ServiceItem, StackItem, StackRef, TemplateService,
};
pub use handler::HandlerRef;
pub use registry::Registry;
pub use resolver::ServiceIter;

use std::path::Path;

use mocknet_common::error::{ConfigError, Result};

/// Parses a configuration graph from in-memory content with no
/// originating file. Relative import paths resolve against `cwd`.
///
/// # Errors
///
/// Returns an error if loading or registration fails anywhere in the
/// reachable graph.
pub fn parse_str(content: &str, cwd: &Path) -> Result<Registry> {
    Registry::parse(content, cwd, None)
}

/// Reads and parses the configuration graph rooted at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the graph fails to
/// load.
pub fn parse_file(path: &Path) -> Result<Registry> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cwd = path.parent().unwrap_or_else(|| Path::new(""));
    Registry::parse(&content, cwd, Some(path))
}
