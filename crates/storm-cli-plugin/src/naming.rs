//! Name derivation for commands, flags, and environment variables.

use heck::{ToKebabCase, ToShoutySnakeCase, ToTitleCase, ToUpperCamelCase};

/// Returns `true` for `[param]` style dynamic path segments.
#[must_use]
pub fn is_dynamic_segment(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('[') && segment.ends_with(']')
}

/// Returns the parameter name of a dynamic segment (`[...slug]` → `slug`).
#[must_use]
pub fn dynamic_parameter(segment: &str) -> Option<&str> {
    if !is_dynamic_segment(segment) {
        return None;
    }
    segment
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(|inner| inner.trim_start_matches("..."))
}

/// Derives a command id from its path: dynamic segments are dropped and the
/// remaining segments joined with `-`.
#[must_use]
pub fn command_id<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .filter(|segment| !is_dynamic_segment(segment))
        .map(|segment| segment.to_kebab_case())
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns the last non-dynamic segment of a path.
#[must_use]
pub fn command_name<S: AsRef<str>>(path: &[S]) -> Option<String> {
    path.iter()
        .map(AsRef::as_ref)
        .rfind(|segment| !is_dynamic_segment(segment))
        .map(ToKebabCase::to_kebab_case)
}

/// Number of non-dynamic segments in a path.
#[must_use]
pub fn command_depth<S: AsRef<str>>(path: &[S]) -> usize {
    path.iter()
        .filter(|segment| !is_dynamic_segment(segment.as_ref()))
        .count()
}

/// Converts a declared property name to its flag name.
#[must_use]
pub fn flag_name(name: &str) -> String {
    name.to_kebab_case()
}

/// Title-cases a command or flag name.
#[must_use]
pub fn title_case(name: &str) -> String {
    name.to_title_case()
}

/// Converts a name to `UPPER_SNAKE_CASE`.
#[must_use]
pub fn upper_snake(name: &str) -> String {
    name.to_shouty_snake_case()
}

/// Converts a name to `PascalCase`.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Environment variable consulted for a flag: `<BIN>_<FLAG>`.
#[must_use]
pub fn env_variable(bin: &str, flag: &str) -> String {
    format!("{}_{}", upper_snake(bin), upper_snake(flag))
}

/// Format-insensitive comparison key: kebab, camel, Pascal, and snake
/// spellings of a name share the same key.
#[must_use]
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Compares two names format-insensitively; names without alphanumerics
/// (such as the `?` alias) only match exactly.
#[must_use]
pub fn same_name(left: &str, right: &str) -> bool {
    if left == right {
        return true;
    }
    let key = normalize(left);
    !key.is_empty() && key == normalize(right)
}
