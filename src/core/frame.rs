//! DataFrame and Column entities plus their draft and patch types.

use serde::{Deserialize, Serialize};

use super::domain::ValueSourceType;
use super::identity::WebId;
use super::meta::Metadata;
use super::permissions::Permissions;

/// Field update wrapper for patch types.
///
/// The clean solution to the `Option<Option<T>>` problem for nullable
/// fields:
/// - `Keep` - don't change the field
/// - `Clear` - set the field to None
/// - `Set(T)` - set the field to Some(T)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Don't change the field.
    #[default]
    Keep,
    /// Clear the field (set to None).
    Clear,
    /// Set the field to a new value.
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Apply the patch to a current value.
    pub fn apply(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Keep => current,
            Patch::Clear => None,
            Patch::Set(v) => Some(v),
        }
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Keep => Patch::Keep,
            Patch::Clear => Patch::Clear,
            Patch::Set(v) => Patch::Set(v),
        }
    }

    pub fn set(&self) -> Option<&T> {
        match self {
            Patch::Set(v) => Some(v),
            _ => None,
        }
    }
}

// Custom serde: absent = Keep, null = Clear, value = Set.
impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Patch::Keep => serializer.serialize_none(),
            Patch::Clear => serializer.serialize_none(),
            Patch::Set(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Present and null -> Clear; present and value -> Set.
        // Absent -> Keep, handled by #[serde(default)] on the field.
        let opt: Option<T> = Option::deserialize(deserializer)?;
        match opt {
            None => Ok(Patch::Clear),
            Some(v) => Ok(Patch::Set(v)),
        }
    }
}

// =============================================================================
// DataFrame
// =============================================================================

/// A named schema of typed columns, owned 1:1 by a user element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    pub id: WebId,
    /// Uppercased at creation; unique under the owner.
    pub name: String,
    pub description: Option<String>,
    pub permissions: Permissions,
    pub metadata: Metadata,
}

/// Shallow listing row for a DataFrame.
///
/// Listings skip the bookkeeping reads; fetch the full entity by id when
/// permissions or metadata are needed. We avoid lossy "view" structs that
/// pretend to be the full entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFrameSummary {
    pub id: WebId,
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating a DataFrame. The name is validated and uppercased by
/// the store, not by the caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DataFrameDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Partial update for DataFrame fields.
///
/// All fields default to `Keep`. `owner_sid` is immutable after creation:
/// a permissions patch replaces the mode and share lists but the store keeps
/// the stored owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataFramePatch {
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub name: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub description: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub permissions: Patch<Permissions>,

    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub metadata: Patch<Metadata>,
}

impl DataFramePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.description.is_keep()
            && self.permissions.is_keep()
            && self.metadata.is_keep()
    }
}

// =============================================================================
// Column
// =============================================================================

/// A named, typed column of a DataFrame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: WebId,
    pub name: String,
    pub value_source_type: ValueSourceType,
    pub value_source: Option<String>,
    pub engineering_unit: Option<String>,
    /// Inferred by the backend; read-only.
    pub value_type: Option<String>,
    pub metadata: Metadata,
    /// 0-based insertion order, preserved across listing.
    pub order: usize,
}

/// Input for creating a Column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnDraft {
    pub name: String,
    pub value_source_type: ValueSourceType,
    #[serde(default)]
    pub value_source: Option<String>,
    #[serde(default)]
    pub engineering_unit: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Partial update for Column fields.
///
/// Changing the source on update is permissive: no catalog re-validation
/// (strict on create, permissive on update).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnPatch {
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub name: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub value_source: Patch<(ValueSourceType, Option<String>)>,

    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub engineering_unit: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub metadata: Patch<Metadata>,
}

impl ColumnPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_keep()
            && self.value_source.is_keep()
            && self.engineering_unit.is_keep()
            && self.metadata.is_keep()
    }
}
