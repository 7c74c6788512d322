//! Opaque references to user handler modules.
//!
//! A service's `handler` field names a module under the
//! `mocknet.handler` namespace. The name is resolved relative to the
//! directory of the file that declared the service, e.g.
//! `mocknet.handler.example` declared in `/srv/mocks/mocknet.yml`
//! resolves to `/srv/mocks/example.py`. Loading the module itself is the
//! runtime's job, not ours.

use std::path::{Path, PathBuf};

use serde::Serialize;

use mocknet_common::constants::{HANDLER_EXTENSION, HANDLER_NAMESPACE};
use mocknet_common::error::{ConfigError, Result};

/// Reference to a user handler module, tied to the directory of the
/// declaring configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerRef {
    base_dir: PathBuf,
    name: String,
}

impl HandlerRef {
    /// Creates a handler reference rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            name: name.into(),
        }
    }

    /// Returns the namespaced handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the directory the name is resolved against.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves the namespaced name to a module file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is outside the handler namespace or
    /// the resolved path is not a file.
    pub fn resolve(&self) -> Result<PathBuf> {
        let prefix = format!("{HANDLER_NAMESPACE}.");
        let Some(rest) = self.name.strip_prefix(&prefix) else {
            return Err(ConfigError::Schema {
                message: format!(
                    "handler '{}' should be under the '{HANDLER_NAMESPACE}' namespace",
                    self.name
                ),
                file: self.base_dir.clone(),
            });
        };

        let mut path = self.base_dir.clone();
        for segment in rest.split('.') {
            path.push(segment);
        }
        let _ = path.set_extension(HANDLER_EXTENSION);

        if !path.is_file() {
            return Err(ConfigError::NotFound {
                kind: "handler",
                name: self.name.clone(),
                detail: format!("resolved path {} is not a file", path.display()),
            });
        }
        Ok(path)
    }
}

/// Derives the namespaced handler name for a module file under `root`.
///
/// Inverse of [`HandlerRef::resolve`].
///
/// # Errors
///
/// Returns an error if `path` does not live under `root`.
pub fn handler_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(root).map_err(|_| ConfigError::Schema {
        message: format!(
            "'{}' is not under the handler root '{}'",
            path.display(),
            root.display()
        ),
        file: path.to_path_buf(),
    })?;

    let segments: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();

    Ok(format!("{HANDLER_NAMESPACE}.{}", segments.join(".")))
}
