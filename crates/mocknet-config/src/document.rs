//! Immutable model for a single configuration document.
//!
//! A [`Document`] is produced once by the loader and never mutated
//! afterwards. Concrete services handed out by the resolver are fresh
//! copies, so resolving a template never touches the template's own record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::handler::HandlerRef;

/// One parsed configuration file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Directory used to resolve relative paths in this document.
    pub cwd: PathBuf,
    /// Originating file; empty when the document was parsed from a string.
    pub file: PathBuf,
    /// Declared schema version.
    pub version: i64,
    /// Import declarations, in declaration order.
    pub imports: Vec<ImportItem>,
    /// Stack definitions, in declaration order.
    pub stacks: Vec<StackItem>,
    /// Service items, in declaration order.
    pub services: Vec<ServiceItem>,
}

/// A reference to another configuration file.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct ImportItem {
    /// Canonical (symlink-resolved, absolute) path of the imported file.
    pub path: PathBuf,
    /// Optional user-chosen alias.
    pub name: Option<String>,
    /// File that declared this import.
    pub file: PathBuf,
}

impl ImportItem {
    /// Returns the key under which this import is registered: the alias
    /// when one was given, otherwise the canonical path itself.
    #[must_use]
    pub fn alias_key(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Import identity is the resolved file path, not the spelling of the
/// reference.
impl PartialEq for ImportItem {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

/// A named, ordered list of service names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackItem {
    /// Stack name, non-empty.
    pub name: String,
    /// Member service names; order is the expansion order.
    pub services: Vec<String>,
    /// File that declared this stack.
    pub file: PathBuf,
}

/// A service item as it appears in a document.
///
/// Variant selection happens at load time and is a closed set: an item
/// carrying a `stack` key is a placeholder, an item with both `template`
/// and `name` inherits from another service, and an item with just `name`
/// is directly usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ServiceItem {
    /// Concrete, directly usable service.
    Basic(BasicService),
    /// Service inheriting unset fields from a named base service.
    Template(TemplateService),
    /// Placeholder expanding to the members of a named stack.
    Stack(StackRef),
}

impl ServiceItem {
    /// Returns the item's name; stack placeholders are anonymous.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Basic(service) => Some(&service.name),
            Self::Template(service) => Some(&service.name),
            Self::Stack(_) => None,
        }
    }

    /// Returns the file that declared this item.
    #[must_use]
    pub fn file(&self) -> &Path {
        match self {
            Self::Basic(service) => &service.file,
            Self::Template(service) => &service.file,
            Self::Stack(stack_ref) => &stack_ref.file,
        }
    }

    /// Prepends a provenance tag to the item's `inherits` chain.
    pub(crate) fn prepend_inherit(&mut self, tag: String) {
        let inherits = match self {
            Self::Basic(service) => &mut service.inherits,
            Self::Template(service) => &mut service.inherits,
            Self::Stack(stack_ref) => &mut stack_ref.inherits,
        };
        inherits.insert(0, tag);
    }
}

/// Concrete service definition. Every service item is eventually resolved
/// to this type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicService {
    /// Service name, non-empty and unique across the whole graph.
    pub name: String,
    /// Host the service binds to; empty means unspecified.
    pub host: String,
    /// URL path the service answers on; empty means unspecified.
    pub path: String,
    /// Port in `[0, 65535]`; `0` means unspecified.
    pub port: u16,
    /// Wire protocol; empty means unspecified.
    pub protocol: String,
    /// Free-form protocol-specific configuration. Any field on a service
    /// item that is not otherwise recognized lands here verbatim.
    pub protocol_attrs: BTreeMap<String, serde_yaml::Value>,
    /// Reference to the user handler backing this service.
    pub handler: Option<HandlerRef>,
    /// File that declared this service.
    pub file: PathBuf,
    /// Provenance tags (`"template:base"`, `"stack:web"`) recording how
    /// this record was derived, for diagnostics.
    pub inherits: Vec<String>,
}

/// Service inheriting field values from another named service.
///
/// Fields left at their zero value do not override the base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateService {
    /// Name of the resulting service.
    pub name: String,
    /// Name of the service to inherit from, non-empty.
    pub template: String,
    /// Host override; empty string does not override.
    pub host: String,
    /// Path override; empty string does not override.
    pub path: String,
    /// Port override; `0` does not override.
    pub port: u16,
    /// Protocol override; empty string does not override.
    pub protocol: String,
    /// Protocol attributes override; an empty map does not override.
    pub protocol_attrs: BTreeMap<String, serde_yaml::Value>,
    /// Handler override; `None` does not override.
    pub handler: Option<HandlerRef>,
    /// File that declared this item.
    pub file: PathBuf,
    /// Provenance tags accumulated before resolution.
    pub inherits: Vec<String>,
}

impl TemplateService {
    /// Overwrites every field of `target` for which this item supplies a
    /// non-zero value. `name`, `file`, and `inherits` are never touched.
    pub(crate) fn apply_overrides(&self, target: &mut BasicService) {
        if !self.host.is_empty() {
            target.host = self.host.clone();
        }
        if !self.path.is_empty() {
            target.path = self.path.clone();
        }
        if self.port != 0 {
            target.port = self.port;
        }
        if !self.protocol.is_empty() {
            target.protocol = self.protocol.clone();
        }
        if !self.protocol_attrs.is_empty() {
            target.protocol_attrs = self.protocol_attrs.clone();
        }
        if let Some(handler) = &self.handler {
            target.handler = Some(handler.clone());
        }
    }
}

/// Placeholder that expands to the members of a named stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackRef {
    /// Name of the referenced stack, non-empty.
    pub stack: String,
    /// File that declared this placeholder.
    pub file: PathBuf,
    /// Provenance tags accumulated before expansion.
    pub inherits: Vec<String>,
}
