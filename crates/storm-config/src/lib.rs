//! Layered configuration for the Storm Stack command engine.
//!
//! [`Config`] is assembled by `ortho_config` from, in increasing precedence,
//! built-in defaults, a `storm.toml` configuration file (or the file named by
//! `--config-path`), `STORM_*` environment variables, and command-line flags.

mod defaults;
mod interactive;
mod logging;

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_APP_NAME, DEFAULT_APP_VERSION, DEFAULT_ARTIFACTS_DIR, DEFAULT_BIN_ENTRY,
    DEFAULT_CACHE_DIR, DEFAULT_COMMANDS_DIR, DEFAULT_LOG_FILTER, default_app_name,
    default_app_version, default_artifacts_dir, default_bin_entry, default_cache_dir,
    default_colors, default_commands_dir, default_interactive, default_log_filter,
    default_log_format,
};
pub use interactive::InteractiveMode;
pub use logging::{LogFormat, LogFormatParseError};

/// Configuration shared by the `storm` binary and the command engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "STORM")]
pub struct Config {
    /// Directory scanned for command handler modules.
    #[serde(default = "default_commands_dir")]
    #[ortho_config(default = default_commands_dir())]
    pub commands_dir: Utf8PathBuf,

    /// Directory receiving generated TypeScript sources.
    #[serde(default = "default_artifacts_dir")]
    #[ortho_config(default = default_artifacts_dir())]
    pub artifacts_dir: Utf8PathBuf,

    /// Directory holding the persisted reflection cache.
    #[serde(default = "default_cache_dir")]
    #[ortho_config(default = default_cache_dir())]
    pub cache_dir: Utf8PathBuf,

    /// File name of the generated root dispatcher inside the artifacts
    /// directory.
    #[serde(default = "default_bin_entry")]
    #[ortho_config(default = default_bin_entry())]
    pub bin_entry: String,

    /// Application name.
    #[serde(default = "default_app_name")]
    #[ortho_config(default = default_app_name())]
    pub name: String,

    /// Display title; derived from the name when absent.
    #[serde(default)]
    pub title: Option<String>,

    /// Application description shown in the root usage text.
    #[serde(default)]
    pub description: Option<String>,

    /// Version reported by the generated application's `--version`; set
    /// on the command line as `--app-version`.
    #[serde(default = "default_app_version")]
    #[ortho_config(default = default_app_version(), cli_long = "app-version")]
    pub version: String,

    /// Executable names of the generated application; the first is the
    /// primary name. Defaults to the application name.
    #[serde(default)]
    pub bin: Vec<String>,

    /// Interactive prompting policy of generated commands.
    #[serde(default = "default_interactive")]
    #[ortho_config(default = default_interactive())]
    pub interactive: InteractiveMode,

    /// Whether generated output uses ANSI colours.
    #[serde(default = "default_colors")]
    #[ortho_config(default = default_colors())]
    pub colors: bool,

    /// Filter expression for the binary's log output.
    #[serde(default = "default_log_filter")]
    #[ortho_config(default = default_log_filter())]
    pub log_filter: String,

    /// Format of the binary's log output.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            commands_dir: default_commands_dir(),
            artifacts_dir: default_artifacts_dir(),
            cache_dir: default_cache_dir(),
            bin_entry: default_bin_entry(),
            name: default_app_name(),
            title: None,
            description: None,
            version: default_app_version(),
            bin: Vec::new(),
            interactive: default_interactive(),
            colors: default_colors(),
            log_filter: default_log_filter(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from an explicit argument list.
    ///
    /// The first element is treated as the program name, mirroring
    /// `std::env::args_os`.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when a source is malformed.
    pub fn from_args<I, T>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Executable names of the generated application.
    ///
    /// Falls back to the application name when no explicit names are set.
    #[must_use]
    pub fn bin_names(&self) -> Vec<String> {
        let names: Vec<String> = self
            .bin
            .iter()
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            vec![self.name.clone()]
        } else {
            names
        }
    }

    /// Primary executable name.
    #[must_use]
    pub fn primary_bin(&self) -> String {
        self.bin_names()
            .into_iter()
            .next()
            .unwrap_or_else(|| self.name.clone())
    }

    /// Path of the generated root dispatcher.
    #[must_use]
    pub fn bin_entry_path(&self) -> Utf8PathBuf {
        self.artifacts_dir.join(&self.bin_entry)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_point_at_conventional_directories() {
        let config = Config::default();

        assert_eq!(config.commands_dir, Utf8PathBuf::from("src/commands"));
        assert_eq!(config.bin_entry_path(), Utf8PathBuf::from(".storm/cli/bin.ts"));
        assert_eq!(config.interactive, InteractiveMode::Auto);
        assert!(config.colors);
    }

    #[rstest]
    #[case(vec![], vec!["storm-app"])]
    #[case(vec!["acme", "ac"], vec!["acme", "ac"])]
    #[case(vec!["  "], vec!["storm-app"])]
    fn bin_names_fall_back_to_app_name(#[case] bins: Vec<&str>, #[case] expected: Vec<&str>) {
        let config = Config {
            bin: bins.into_iter().map(str::to_owned).collect(),
            ..Config::default()
        };

        assert_eq!(config.bin_names(), expected);
        assert_eq!(config.primary_bin(), expected.first().copied().unwrap_or_default());
    }
}
