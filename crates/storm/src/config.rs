//! Separation of configuration flags from the command tokens.
//!
//! Configuration flags must come before the sub-command; they are handed to
//! `ortho_config` while the remaining tokens go to `clap`.

use std::ffi::{OsStr, OsString};

use storm_config::Config;

use crate::errors::AppError;

/// Flags recognised by the configuration loader. Each takes one value,
/// either inline (`--flag=value`) or as the next argument.
///
/// Keep in sync with the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--commands-dir",
    "--artifacts-dir",
    "--cache-dir",
    "--bin-entry",
    "--name",
    "--title",
    "--description",
    "--app-version",
    "--interactive",
    "--log-filter",
    "--log-format",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name and configuration flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loads configuration through `ortho_config`.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::from_args(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = text
        .split_once('=')
        .map_or((text.as_ref(), false), |(flag, _)| (flag, true));
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split into the configuration loader's share and clap's share;
/// both start with the program name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) cli_arguments: Vec<OsString>,
}

pub(crate) fn split_arguments(args: &[OsString]) -> ArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ArgumentSplit {
            config_arguments: Vec::new(),
            cli_arguments: Vec::new(),
        };
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut pending_value = false;
    let mut cli_arguments = vec![program.clone()];
    for argument in remaining.by_ref() {
        if pending_value {
            config_arguments.push(argument.clone());
            pending_value = false;
            continue;
        }
        match classify(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                pending_value = needs_value;
            }
            FlagAction::Stop => {
                cli_arguments.push(argument.clone());
                break;
            }
        }
    }
    cli_arguments.extend(remaining.cloned());

    ArgumentSplit {
        config_arguments,
        cli_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--log-filter", FlagAction::Include { needs_value: true })]
    #[case("--app-version=2.0.0", FlagAction::Include { needs_value: false })]
    #[case("--version", FlagAction::Stop)]
    #[case("prepare", FlagAction::Stop)]
    #[case("--force", FlagAction::Stop)]
    fn classifies_arguments(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify(OsStr::new(argument)), expected);
    }

    #[test]
    fn configuration_flags_precede_the_command() {
        let split = split_arguments(&os(&[
            "storm",
            "--commands-dir",
            "app/commands",
            "--log-format=json",
            "prepare",
            "--force",
        ]));

        assert_eq!(
            split.config_arguments,
            os(&["storm", "--commands-dir", "app/commands", "--log-format=json"])
        );
        assert_eq!(split.cli_arguments, os(&["storm", "prepare", "--force"]));
    }

    #[test]
    fn flags_after_the_command_stay_with_clap() {
        let split = split_arguments(&os(&["storm", "tree", "--name", "acme"]));

        assert_eq!(split.config_arguments, os(&["storm"]));
        assert_eq!(split.cli_arguments, os(&["storm", "tree", "--name", "acme"]));
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        let split = split_arguments(&[]);

        assert!(split.config_arguments.is_empty());
        assert!(split.cli_arguments.is_empty());
    }
}
