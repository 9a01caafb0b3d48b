//! Shell completion handlers.
//!
//! Each handler prints a script that asks the generated executable for
//! candidates through `--get-completions`, so the scripts only depend on the
//! executable name.

use camino::Utf8PathBuf;
use storm_reflection::quote;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::writer::SourceWriter;

/// Flag the generated executable answers with completion candidates.
pub const GET_COMPLETIONS_FLAG: &str = "--get-completions";

const BASH_TEMPLATE: &str = r#"###-begin-__BIN__-completions-###
__FN__() {
  local IFS=$'\n'
  COMPREPLY=($(__BIN__ --get-completions "${COMP_WORDS[@]:1:$COMP_CWORD}"))
}
complete -o default -F __FN__ __BIN__
###-end-__BIN__-completions-###"#;

const ZSH_TEMPLATE: &str = r#"#compdef __BIN__
__FN__() {
  local -a candidates
  candidates=("${(@f)$(__BIN__ --get-completions "${words[@]:1:$((CURRENT - 1))}")}")
  compadd -- $candidates
}
compdef __FN__ __BIN__"#;

/// Shells with generated completion handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Shell {
    /// GNU Bash.
    Bash,
    /// Z shell.
    Zsh,
}

impl Shell {
    /// Completion script for `bin`.
    #[must_use]
    pub fn script(self, bin: &str) -> String {
        let template = match self {
            Self::Bash => BASH_TEMPLATE,
            Self::Zsh => ZSH_TEMPLATE,
        };
        template
            .replace("__FN__", &completion_function(bin))
            .replace("__BIN__", bin)
    }

    /// Handler module, relative to the artifacts directory.
    #[must_use]
    pub fn handler_file(self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("completions/{self}/handle.ts"))
    }

    /// Renders the handler module for `bin`.
    #[must_use]
    pub fn render(self, bin: &str) -> String {
        let mut w = SourceWriter::module();
        w.line(format!("export const script = {};", quote(&self.script(bin))));
        w.blank();
        w.open("export function handle(): void");
        w.line("console.log(script);");
        w.close();
        w.finish()
    }

    /// Every supported shell.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

fn completion_function(bin: &str) -> String {
    let sanitized: String = bin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("_{sanitized}_completions")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Shell::Bash, "completions/bash/handle.ts")]
    #[case(Shell::Zsh, "completions/zsh/handle.ts")]
    fn handlers_live_under_the_shell_name(#[case] shell: Shell, #[case] expected: &str) {
        assert_eq!(shell.handler_file(), Utf8PathBuf::from(expected));
    }

    #[rstest]
    #[case(Shell::Bash, "complete -o default -F _acme_cli_completions acme-cli")]
    #[case(Shell::Zsh, "compdef _acme_cli_completions acme-cli")]
    fn scripts_are_parameterised_by_bin(#[case] shell: Shell, #[case] registration: &str) {
        let script = shell.script("acme-cli");

        assert!(script.contains(registration), "{script}");
        assert!(script.contains("acme-cli --get-completions"));
        assert!(!script.contains("__BIN__"));
    }

    #[test]
    fn handler_prints_the_embedded_script() {
        let module = Shell::Bash.render("acme");

        assert!(module.contains("export const script = \"###-begin-acme-completions-###\\n"));
        assert!(module.contains("export function handle(): void {"));
    }

    #[test]
    fn shells_parse_from_lowercase_names() {
        assert_eq!(Shell::from_str("zsh").ok(), Some(Shell::Zsh));
        assert_eq!(Shell::all().count(), 2);
    }
}
