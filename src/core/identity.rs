//! Identity atoms and the current-user descriptor.
//!
//! WebId: opaque backend-assigned identifier
//! Sid: security identifier string
//! UserIdentity: who is calling, as reported by the identity provider

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::IdentityType;
use super::error::{CoreError, InvalidId};

/// Opaque backend-assigned identifier for an element, attribute, or point.
///
/// Never fabricated locally; the only constraint is non-emptiness.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebId(String);

impl WebId {
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.is_empty() {
            Err(InvalidId::EmptyWebId.into())
        } else {
            Ok(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebId({:?})", self.0)
    }
}

impl fmt::Display for WebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Security identifier - non-empty string.
///
/// The backend hands these out; no structural validation beyond non-empty.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sid(String);

impl Sid {
    pub fn new(s: impl Into<String>) -> Result<Self, CoreError> {
        let s = s.into();
        if s.trim().is_empty() {
            Err(InvalidId::Sid {
                raw: s,
                reason: "empty".into(),
            }
            .into())
        } else {
            Ok(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sid({:?})", self.0)
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The calling user, as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub identity_type: IdentityType,
    pub name: String,
    pub authenticated: bool,
    pub sid: Option<Sid>,
}

impl UserIdentity {
    /// Read-only fallback identity used when identity resolution fails with
    /// an auth error.
    pub fn anonymous() -> Self {
        Self {
            identity_type: IdentityType::Anonymous,
            name: String::new(),
            authenticated: false,
            sid: None,
        }
    }

    pub fn sid_string(&self) -> String {
        self.sid
            .as_ref()
            .map(|sid| sid.as_str().to_string())
            .unwrap_or_default()
    }
}

/// The account element that owns a user's DataFrames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserElement {
    pub web_id: WebId,
    pub normalized_name: String,
    pub sid: String,
    pub identity_type: IdentityType,
    pub original_name: String,
    pub created_at_ms: u64,
}
