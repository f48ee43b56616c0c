//! Naming rules for commands, parameters and aliases.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::SpecError;

pub const NAME_PATTERN: &str = r"^([a-z0-9]+-?)*[a-z0-9]+$";
pub const ALIAS_PATTERN: &str = r"^[a-z0-9]+$";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_PATTERN).unwrap());
static ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(ALIAS_PATTERN).unwrap());

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate and normalize a command name.
pub fn command_name(raw: &str) -> Result<String, SpecError> {
    let name = normalize(raw);
    if !NAME_RE.is_match(&name) {
        return Err(SpecError::BadCommandName {
            name: raw.to_string(),
            pattern: NAME_PATTERN,
        });
    }
    Ok(name)
}

/// Validate and normalize a parameter name.
pub fn parameter_name(raw: &str) -> Result<String, SpecError> {
    let name = normalize(raw);
    if !NAME_RE.is_match(&name) {
        return Err(SpecError::BadParameterName {
            name: raw.to_string(),
            pattern: NAME_PATTERN,
        });
    }
    Ok(name)
}

/// Validate and normalize an alias of `parameter`.
pub fn alias(parameter: &str, raw: &str) -> Result<String, SpecError> {
    let alias = normalize(raw);
    if !ALIAS_RE.is_match(&alias) {
        return Err(SpecError::BadAlias {
            parameter: parameter.to_string(),
            alias: raw.to_string(),
            pattern: ALIAS_PATTERN,
        });
    }
    Ok(alias)
}

/// Derive the record field name from a parameter name: `date-time` -> `DateTime`.
pub fn target_field(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
