//! Open metadata map with reserved-key detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::DecodeError;

/// String-keyed metadata attached to a DataFrame or Column.
///
/// Keys that start and end with an underscore are reserved for internal
/// bookkeeping. Reserved keys are flagged for callers, never silently
/// dropped.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Keys matching the reserved pattern (leading and trailing underscore).
    pub fn reserved_keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .map(String::as_str)
            .filter(|key| is_reserved_key(key))
            .collect()
    }

    /// Serialize for storage in a bookkeeping attribute value.
    pub fn encode(&self) -> String {
        serde_json::to_string(&self.0).expect("string-keyed value maps serialize")
    }

    /// Decode a stored blob. Callers choose the fallback; the documented
    /// policy for absent or malformed bookkeeping blobs is the empty map.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        serde_json::from_str(raw).map_err(|err| DecodeError {
            slot: "metadata",
            detail: err.to_string(),
        })
    }
}

impl From<BTreeMap<String, Value>> for Metadata {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A key is reserved when it both starts and ends with an underscore.
///
/// A lone `_` is not reserved: the pattern needs two anchor characters.
pub fn is_reserved_key(key: &str) -> bool {
    key.len() >= 2 && key.starts_with('_') && key.ends_with('_')
}
