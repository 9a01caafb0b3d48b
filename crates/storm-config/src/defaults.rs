//! Default values shared by the configuration loader and `Config::default`.

use camino::Utf8PathBuf;

use crate::interactive::InteractiveMode;
use crate::logging::LogFormat;

/// Directory scanned for command handler modules.
pub const DEFAULT_COMMANDS_DIR: &str = "src/commands";

/// Directory receiving generated TypeScript sources.
pub const DEFAULT_ARTIFACTS_DIR: &str = ".storm/cli";

/// Directory holding the persisted reflection cache.
pub const DEFAULT_CACHE_DIR: &str = ".storm/cache";

/// File name of the generated root dispatcher.
pub const DEFAULT_BIN_ENTRY: &str = "bin.ts";

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "storm-app";

/// Version reported by generated applications when none is configured.
pub const DEFAULT_APP_VERSION: &str = "0.0.0";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default commands directory.
pub fn default_commands_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_COMMANDS_DIR)
}

/// Default artifacts directory.
pub fn default_artifacts_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_ARTIFACTS_DIR)
}

/// Default cache directory.
pub fn default_cache_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_CACHE_DIR)
}

/// Default root dispatcher file name.
pub fn default_bin_entry() -> String {
    DEFAULT_BIN_ENTRY.to_owned()
}

/// Default application name.
pub fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_owned()
}

/// Default application version.
pub fn default_app_version() -> String {
    DEFAULT_APP_VERSION.to_owned()
}

/// Generated applications use colours unless told otherwise.
pub const fn default_colors() -> bool {
    true
}

/// Default interactive prompting policy.
pub const fn default_interactive() -> InteractiveMode {
    InteractiveMode::Auto
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
