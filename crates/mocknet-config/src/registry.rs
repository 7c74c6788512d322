//! Import-graph traversal and entity registration.
//!
//! A [`Registry`] owns everything reachable from one root document: the
//! loaded documents keyed by canonical file path, import aliases, stack
//! definitions, and named services. A file is loaded at most once no
//! matter how many documents reference it, which is what keeps cyclic
//! import graphs from recursing forever.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use mocknet_common::error::{ConfigError, Result};

use crate::document::{Document, ImportItem, ServiceItem, StackItem};
use crate::loader;

/// The fully loaded configuration graph for one `parse` invocation.
///
/// Each invocation owns its own registry; nothing here is shared or
/// global, so multiple independent graphs can be resolved in one process.
#[derive(Debug)]
pub struct Registry {
    /// Loaded documents in breadth-first load order; the root is first.
    documents: Vec<Document>,
    /// Canonical path to document index.
    by_path: HashMap<PathBuf, usize>,
    pub(crate) imports: HashMap<String, ImportItem>,
    pub(crate) stacks: HashMap<String, StackItem>,
    pub(crate) services: HashMap<String, ServiceItem>,
}

impl Registry {
    /// Parses the configuration graph rooted at `content`.
    ///
    /// `cwd` is the directory relative paths resolve against; `file` is
    /// the root document's identity, if it came from a file.
    ///
    /// # Errors
    ///
    /// Returns an error on unreadable files, malformed documents,
    /// unsupported versions, or conflicting duplicate definitions.
    pub fn parse(content: &str, cwd: &Path, file: Option<&Path>) -> Result<Self> {
        let cwd = if cwd.as_os_str().is_empty() {
            cwd.to_path_buf()
        } else {
            cwd.canonicalize().map_err(|source| ConfigError::Io {
                path: cwd.to_path_buf(),
                source,
            })?
        };
        let file = match file {
            Some(path) if !path.as_os_str().is_empty() => {
                path.canonicalize().map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            _ => PathBuf::new(),
        };
        tracing::info!(file = %file.display(), "parsing configuration graph");

        let mut registry = Self {
            documents: Vec::new(),
            by_path: HashMap::new(),
            imports: HashMap::new(),
            stacks: HashMap::new(),
            services: HashMap::new(),
        };

        let root = loader::load_document(content, &cwd, &file)?;
        let mut queue: VecDeque<ImportItem> = root.imports.iter().cloned().collect();
        registry.insert_document(root);

        while let Some(import) = queue.pop_front() {
            registry.register_import(&import)?;
            if registry.by_path.contains_key(&import.path) {
                // Already loaded; re-importing the same file under another
                // alias is a no-op beyond the alias registration above.
                continue;
            }
            let content = fs::read_to_string(&import.path).map_err(|source| ConfigError::Io {
                path: import.path.clone(),
                source,
            })?;
            let parent = import.path.parent().unwrap_or_else(|| Path::new(""));
            let document = loader::load_document(&content, parent, &import.path)?;
            queue.extend(document.imports.iter().cloned());
            registry.insert_document(document);
        }

        let stacks: Vec<StackItem> = registry
            .documents
            .iter()
            .flat_map(|document| document.stacks.iter().cloned())
            .collect();
        for stack in stacks {
            registry.register_stack(stack)?;
        }

        let named: Vec<ServiceItem> = registry
            .documents
            .iter()
            .flat_map(|document| document.services.iter())
            .filter(|service| service.name().is_some())
            .cloned()
            .collect();
        for service in named {
            registry.register_service(service)?;
        }

        tracing::debug!(
            documents = registry.documents.len(),
            stacks = registry.stacks.len(),
            services = registry.services.len(),
            "configuration graph loaded"
        );
        Ok(registry)
    }

    /// Returns the root document of the graph.
    #[must_use]
    pub fn root(&self) -> &Document {
        // A registry is only ever constructed by `parse`, which inserts
        // the root document before returning.
        &self.documents[0]
    }

    /// Returns every loaded document in breadth-first load order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Returns the registered imports, keyed by alias.
    #[must_use]
    pub fn imports(&self) -> &HashMap<String, ImportItem> {
        &self.imports
    }

    /// Returns the registered stacks, keyed by name.
    #[must_use]
    pub fn stacks(&self) -> &HashMap<String, StackItem> {
        &self.stacks
    }

    /// Returns the registered named services, keyed by name.
    #[must_use]
    pub fn services(&self) -> &HashMap<String, ServiceItem> {
        &self.services
    }

    fn insert_document(&mut self, document: Document) {
        let _ = self
            .by_path
            .insert(document.file.clone(), self.documents.len());
        self.documents.push(document);
    }

    fn register_import(&mut self, import: &ImportItem) -> Result<()> {
        let key = import.alias_key();
        if let Some(previous) = self.imports.get(&key) {
            if previous.path == import.path {
                return Ok(());
            }
            return Err(ConfigError::Conflict {
                kind: "import alias",
                name: key,
                detail: format!(
                    "resolves to both {} (declared in {}) and {} (declared in {})",
                    previous.path.display(),
                    previous.file.display(),
                    import.path.display(),
                    import.file.display()
                ),
            });
        }
        let _ = self.imports.insert(key, import.clone());
        Ok(())
    }

    fn register_stack(&mut self, stack: StackItem) -> Result<()> {
        if let Some(previous) = self.stacks.get(&stack.name) {
            // Identical redefinitions are tolerated; only differing
            // service lists are a conflict.
            if previous.services == stack.services {
                return Ok(());
            }
            return Err(ConfigError::Conflict {
                kind: "stack",
                name: stack.name.clone(),
                detail: format!(
                    "defined with services {:?} in {} and {:?} in {}",
                    previous.services,
                    previous.file.display(),
                    stack.services,
                    stack.file.display()
                ),
            });
        }
        let _ = self.stacks.insert(stack.name.clone(), stack);
        Ok(())
    }

    fn register_service(&mut self, service: ServiceItem) -> Result<()> {
        let Some(name) = service.name() else {
            return Ok(());
        };
        if let Some(previous) = self.services.get(name) {
            return Err(ConfigError::Conflict {
                kind: "service",
                name: name.to_owned(),
                detail: format!(
                    "declared in both {} and {}",
                    previous.file().display(),
                    service.file().display()
                ),
            });
        }
        let _ = self.services.insert(name.to_owned(), service);
        Ok(())
    }
}
