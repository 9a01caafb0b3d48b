//! Generation options derived from the loaded configuration.

use camino::{Utf8Path, Utf8PathBuf};
use storm_config::{Config, InteractiveMode};

use crate::naming::title_case;

/// Settings that shape the generated application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    /// Application name.
    pub name: String,
    /// Display title.
    pub title: String,
    /// Root description.
    pub description: String,
    /// Version reported by `--version`.
    pub version: String,
    /// Executable names; the first is the primary name.
    pub bin: Vec<String>,
    /// Interactive prompting policy.
    pub interactive: InteractiveMode,
    /// Whether generated output uses ANSI colours.
    pub colors: bool,
    /// Directory scanned for command handler modules.
    pub commands_dir: Utf8PathBuf,
    /// Directory receiving generated sources.
    pub artifacts_dir: Utf8PathBuf,
    /// Directory holding the reflection cache.
    pub cache_dir: Utf8PathBuf,
    /// File name of the root dispatcher within the artifacts directory.
    pub bin_entry: String,
}

impl CliOptions {
    /// Derives generation options from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let title = config
            .title
            .clone()
            .unwrap_or_else(|| title_case(&config.name));
        let description = config
            .description
            .clone()
            .unwrap_or_else(|| format!("The {title} command-line interface."));
        Self {
            name: config.name.clone(),
            description,
            title,
            version: config.version.clone(),
            bin: config.bin_names(),
            interactive: config.interactive,
            colors: config.colors,
            commands_dir: config.commands_dir.clone(),
            artifacts_dir: config.artifacts_dir.clone(),
            cache_dir: config.cache_dir.clone(),
            bin_entry: config.bin_entry.clone(),
        }
    }

    /// Options for a project rooted at `root`, with every directory resolved
    /// against it.
    #[must_use]
    pub fn rooted_at(mut self, root: &Utf8Path) -> Self {
        self.commands_dir = root.join(&self.commands_dir);
        self.artifacts_dir = root.join(&self.artifacts_dir);
        self.cache_dir = root.join(&self.cache_dir);
        self
    }

    /// Primary executable name.
    #[must_use]
    pub fn primary_bin(&self) -> &str {
        self.bin.first().map_or(self.name.as_str(), String::as_str)
    }

    /// Text folded into the cache checksum: every option that changes the
    /// generated output.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "name={}\ntitle={}\ndescription={}\nversion={}\nbin={}\ninteractive={}\ncolors={}\nentry={}\n",
            self.name,
            self.title,
            self.description,
            self.version,
            self.bin.join(","),
            self.interactive,
            self.colors,
            self.bin_entry,
        )
    }
}

impl Default for CliOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_description_derive_from_name() {
        let config = Config {
            name: "acme-tools".into(),
            ..Config::default()
        };

        let options = CliOptions::from_config(&config);

        assert_eq!(options.title, "Acme Tools");
        assert_eq!(options.description, "The Acme Tools command-line interface.");
        assert_eq!(options.primary_bin(), "acme-tools");
    }

    #[test]
    fn fingerprint_tracks_interactive_policy() {
        let auto = CliOptions::default();
        let never = CliOptions {
            interactive: InteractiveMode::Never,
            ..CliOptions::default()
        };

        assert_ne!(auto.fingerprint(), never.fingerprint());
    }
}
