//! System-wide constants.

/// Application name used in CLI output and logging.
pub const APP_NAME: &str = "mocknet";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "mocknet";

/// Default configuration file looked up by CLI commands.
pub const DEFAULT_CONFIG_FILE: &str = "mocknet.yml";

/// Schema version written by this release.
pub const CURRENT_VERSION: i64 = 0;

/// Schema versions this release can load.
pub const SUPPORTED_VERSIONS: &[i64] = &[0];

/// Namespace under which user handler modules are addressed.
pub const HANDLER_NAMESPACE: &str = "mocknet.handler";

/// File extension of user handler modules.
pub const HANDLER_EXTENSION: &str = "py";
