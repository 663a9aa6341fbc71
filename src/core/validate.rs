//! Pure domain validators, run by every mutation entry point before any
//! network call. A validation failure carries zero side effects.

use serde::{Deserialize, Serialize};

use super::domain::ValueSourceType;
use super::error::{CoreError, InvalidName, InvalidValueSource};

/// Characters the store rejects in element and attribute names.
pub const DEFAULT_INVALID_NAME_CHARS: &str = "*?;{}[]|\\`'\"";

/// Naming rules for elements and attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
    /// Uppercase names on creation and when deriving account-element names.
    pub uppercase: bool,
    /// Replacement for backslashes in identity-derived names.
    pub backslash_replacement: char,
    pub max_name_len: usize,
    pub invalid_chars: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            uppercase: true,
            backslash_replacement: '_',
            max_name_len: 255,
            invalid_chars: DEFAULT_INVALID_NAME_CHARS.to_string(),
        }
    }
}

/// Validate a DataFrame or Column name against the naming rules.
pub fn validate_name(name: &str, rules: &NamingRules) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(InvalidName {
            raw: name.to_string(),
            message: "Name is required".to_string(),
        }
        .into());
    }
    let length = name.chars().count();
    if length > rules.max_name_len {
        return Err(InvalidName {
            raw: name.to_string(),
            message: format!(
                "Name must be {} characters or fewer (got {length})",
                rules.max_name_len
            ),
        }
        .into());
    }
    if let Some(bad) = name.chars().find(|c| rules.invalid_chars.contains(*c)) {
        return Err(InvalidName {
            raw: name.to_string(),
            message: format!("Name contains invalid character `{bad}`"),
        }
        .into());
    }
    Ok(())
}

/// Validate that a value source is consistent with its source type.
///
/// FixedValue accepts the empty string (a legitimate fixed value); only
/// absence is rejected.
pub fn validate_value_source(
    kind: ValueSourceType,
    source: Option<&str>,
) -> Result<(), CoreError> {
    let invalid = |requirement: &'static str| -> CoreError {
        InvalidValueSource {
            kind: kind.as_str(),
            requirement,
        }
        .into()
    };
    match kind {
        ValueSourceType::PiTag => match source {
            Some(path) if !path.is_empty() => Ok(()),
            _ => Err(invalid("a non-empty tag path")),
        },
        ValueSourceType::FixedValue => match source {
            Some(_) => Ok(()),
            None => Err(invalid("a value")),
        },
        ValueSourceType::Formula => match source {
            Some(expr) if !expr.is_empty() => Ok(()),
            _ => Err(invalid("a non-empty expression")),
        },
    }
}

/// Derive the account element name for an identity name.
///
/// Pure and idempotent: the same identity always yields the same element
/// name, and re-normalizing a normalized name is a no-op.
pub fn normalized_account_name(name: &str, rules: &NamingRules) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\\' {
                rules.backslash_replacement
            } else {
                c
            }
        })
        .collect();
    if rules.uppercase {
        replaced.to_uppercase()
    } else {
        replaced
    }
}
