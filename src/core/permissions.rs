//! Permission descriptor stored on the reserved bookkeeping child.

use serde::{Deserialize, Serialize};

use super::domain::PermissionMode;
use super::error::DecodeError;

/// Who may see and edit a DataFrame.
///
/// `owner_sid` is set at creation and immutable afterwards. The read/write
/// lists are meaningful only in `Shared` mode; they are carried verbatim in
/// the other modes so a later mode flip does not lose them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub mode: PermissionMode,
    pub owner_sid: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub read: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub write: Vec<String>,
}

impl Permissions {
    pub fn private(owner_sid: impl Into<String>) -> Self {
        Self {
            mode: PermissionMode::Private,
            owner_sid: owner_sid.into(),
            read: Vec::new(),
            write: Vec::new(),
        }
    }

    pub fn public(owner_sid: impl Into<String>) -> Self {
        Self {
            mode: PermissionMode::Public,
            owner_sid: owner_sid.into(),
            read: Vec::new(),
            write: Vec::new(),
        }
    }

    pub fn shared(
        owner_sid: impl Into<String>,
        read: Vec<String>,
        write: Vec<String>,
    ) -> Self {
        Self {
            mode: PermissionMode::Shared,
            owner_sid: owner_sid.into(),
            read,
            write,
        }
    }

    /// The fallback used when the stored descriptor is absent or malformed.
    pub fn unset() -> Self {
        Self::private("")
    }

    /// Serialize for storage in the permissions attribute value.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("permission descriptors serialize")
    }

    /// Decode a stored descriptor. Callers choose the fallback; the
    /// documented policy is [`Permissions::unset`].
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(raw).map_err(|err| DecodeError {
            slot: "permissions",
            detail: err.to_string(),
        })
    }
}
