//! Interactive prompting policy of generated applications.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Controls whether generated commands prompt for missing values.
///
/// The policy decides both whether the `--interactive` and `--no-interactive`
/// flags are generated and how generated handlers behave when neither flag is
/// passed.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum InteractiveMode {
    /// Prompt only when attached to a terminal.
    #[default]
    Auto,
    /// Always prompt for missing values.
    Always,
    /// Never prompt; the interactive flags are not generated.
    Never,
}

impl InteractiveMode {
    /// Returns `true` when generated commands carry the interactive flags.
    #[must_use]
    pub const fn allows_prompting(self) -> bool {
        !matches!(self, Self::Never)
    }
}
