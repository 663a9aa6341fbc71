//! Domain enums.
//!
//! ValueSourceType: PiTag, FixedValue, Formula
//! PermissionMode: PRIVATE, PUBLIC, SHARED
//! IdentityType: windows, local, anonymous

use serde::{Deserialize, Serialize};

/// Where a column's values come from.
///
/// The `PascalCase` tokens double as the legacy description-string markers,
/// so renames here would break compatibility decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ValueSourceType {
    PiTag,
    FixedValue,
    Formula,
}

impl ValueSourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PiTag => "PiTag",
            Self::FixedValue => "FixedValue",
            Self::Formula => "Formula",
        }
    }

    /// Parse a legacy description-string marker (`[PiTag]`, `[FixedValue]`,
    /// `[Formula]`, without the brackets).
    pub fn from_legacy_token(token: &str) -> Option<Self> {
        match token {
            "PiTag" => Some(Self::PiTag),
            "FixedValue" => Some(Self::FixedValue),
            "Formula" => Some(Self::Formula),
            _ => None,
        }
    }
}

/// Visibility of a DataFrame.
///
/// Read/write sid lists are meaningful only for `Shared`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionMode {
    #[default]
    Private,
    Public,
    Shared,
}

impl PermissionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "PRIVATE",
            Self::Public => "PUBLIC",
            Self::Shared => "SHARED",
        }
    }
}

/// How the current user authenticated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityType {
    Windows,
    Local,
    Anonymous,
}

impl IdentityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Local => "local",
            Self::Anonymous => "anonymous",
        }
    }
}
